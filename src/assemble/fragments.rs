//! Fragment assembly: bucket converter output by kind and sort each bucket
//! by the order stamp dispatch assigned.

use std::collections::BTreeMap;

use crate::ir::types::{CodeFragment, FragmentKind};

/// Fragments grouped by kind, each group sorted ascending by `meta.order`.
#[derive(Debug, Default)]
pub struct AssembledFragments {
    buckets: BTreeMap<FragmentKind, Vec<CodeFragment>>,
}

impl AssembledFragments {
    pub fn of_kind(&self, kind: FragmentKind) -> &[CodeFragment] {
        self.buckets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All fragments back-to-back, kinds in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &CodeFragment> {
        FragmentKind::ALL
            .iter()
            .flat_map(|k| self.of_kind(*k).iter())
    }

    /// Symbols exported by any fragment, in emission order.
    pub fn exports(&self) -> Vec<String> {
        let mut out = Vec::new();
        for fragment in self.iter() {
            for export in &fragment.meta.exports {
                if !out.contains(export) {
                    out.push(export.clone());
                }
            }
        }
        out
    }

    /// Union of every fragment's declared dependencies, in emission order.
    pub fn dependencies(&self) -> Vec<String> {
        let mut out = Vec::new();
        for fragment in self.iter() {
            for dep in &fragment.dependencies {
                if !out.contains(dep) {
                    out.push(dep.clone());
                }
            }
        }
        out
    }

    pub fn any_async(&self) -> bool {
        self.iter().any(|f| f.meta.is_async)
    }
}

pub fn assemble(fragments: Vec<CodeFragment>) -> AssembledFragments {
    let mut buckets: BTreeMap<FragmentKind, Vec<CodeFragment>> = BTreeMap::new();
    for fragment in fragments {
        buckets.entry(fragment.kind).or_default().push(fragment);
    }
    for group in buckets.values_mut() {
        // Stable: equal orders keep input order.
        group.sort_by_key(|f| f.meta.order);
    }
    AssembledFragments { buckets }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(id: &str, kind: FragmentKind, order: u64) -> CodeFragment {
        let mut f = CodeFragment::new(id, kind, format!("// {id}"));
        f.meta.order = order;
        f
    }

    #[test]
    fn groups_by_kind_and_sorts_by_order() {
        let assembled = assemble(vec![
            frag("b-decl", FragmentKind::Declaration, 1000),
            frag("a-decl", FragmentKind::Declaration, 0),
            frag("b-import", FragmentKind::Import, 1001),
            frag("a-exec", FragmentKind::Execution, 1),
        ]);

        let decls: Vec<&str> = assembled
            .of_kind(FragmentKind::Declaration)
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(decls, vec!["a-decl", "b-decl"]);
        assert_eq!(assembled.of_kind(FragmentKind::Import).len(), 1);
        assert_eq!(assembled.of_kind(FragmentKind::Export).len(), 0);
    }

    #[test]
    fn iter_walks_kinds_in_bucket_order() {
        let assembled = assemble(vec![
            frag("exec", FragmentKind::Execution, 0),
            frag("import", FragmentKind::Import, 5000),
            frag("decl", FragmentKind::Declaration, 2000),
        ]);
        let ids: Vec<&str> = assembled.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["import", "decl", "exec"]);
    }

    #[test]
    fn dependency_union_deduplicates() {
        let mut a = frag("a", FragmentKind::Import, 0);
        a.dependencies = vec!["pkg-one".into(), "pkg-two".into()];
        let mut b = frag("b", FragmentKind::Import, 1);
        b.dependencies = vec!["pkg-two".into(), "pkg-three".into()];

        let assembled = assemble(vec![a, b]);
        assert_eq!(
            assembled.dependencies(),
            vec!["pkg-one", "pkg-two", "pkg-three"]
        );
    }
}
