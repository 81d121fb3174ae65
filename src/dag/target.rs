// src/dag/target.rs

use std::fmt;

use crate::types::TaskName;

/// A composite target: a tree of references to registered names, combined
/// with `series` and `parallel`.
///
/// `Series` members run strictly one after another; `Parallel` members run
/// concurrently with no ordering guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Ref(TaskName),
    Series(Vec<Target>),
    Parallel(Vec<Target>),
}

/// Reference a registered task or target by name.
pub fn task(name: impl Into<TaskName>) -> Target {
    Target::Ref(name.into())
}

/// Run `steps` in order, each waiting for the previous one to complete.
pub fn series(steps: impl IntoIterator<Item = Target>) -> Target {
    Target::Series(steps.into_iter().collect())
}

/// Run `members` concurrently and wait for all of them.
pub fn parallel(members: impl IntoIterator<Item = Target>) -> Target {
    Target::Parallel(members.into_iter().collect())
}

impl Target {
    /// All names referenced anywhere in this tree, in declaration order.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Target::Ref(name) => out.push(name.as_str()),
            Target::Series(items) | Target::Parallel(items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, items) = match self {
            Target::Ref(name) => return f.write_str(name),
            Target::Series(items) => ("series", items),
            Target::Parallel(items) => ("parallel", items),
        };
        write!(f, "{label}(")?;
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_nested_composition() {
        let build = series([
            task("dist"),
            parallel([task("img"), task("svg"), task("css"), task("js")]),
        ]);
        assert_eq!(build.to_string(), "series(dist, parallel(img, svg, css, js))");
    }

    #[test]
    fn references_are_collected_depth_first() {
        let t = series([task("a"), parallel([task("b"), series([task("c")])]), task("d")]);
        assert_eq!(t.references(), vec!["a", "b", "c", "d"]);
    }
}
