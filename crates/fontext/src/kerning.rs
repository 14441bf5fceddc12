//! Kerning flattened down to glyph pairs
//!
//! A kerning side is either a glyph name or the name of a group in the font's
//! [`Groups`]. Flattening replaces each group side by its members. When the
//! whole table is flattened and several entries land on the same glyph pair,
//! the more specific entry wins: glyph/glyph over glyph/group, glyph/group
//! over group/glyph, group/glyph over group/group.

use std::collections::BTreeMap;
use std::sync::Arc;

use fontext_core::events::{GroupsEvent, KerningEvent};
use fontext_core::{CachedMethod, CachedProperty, Dependencies, RegistryBuilder, Result};
use fontext_host::{Groups, Kerning, Pair};

/// Flattened kerning table, shared between cache hits
pub type FlatKerning = Arc<BTreeMap<Pair, f64>>;

type GroupTable = BTreeMap<String, Vec<String>>;

/// Glyph names a kerning side stands for
pub fn expand_side(groups: &GroupTable, side: &str) -> Vec<String> {
    match groups.get(side) {
        Some(members) => members.clone(),
        None => vec![side.to_string()],
    }
}

pub fn flatten_pair(groups: &GroupTable, pair: &Pair) -> Vec<Pair> {
    let seconds = expand_side(groups, &pair.1);
    expand_side(groups, &pair.0)
        .into_iter()
        .flat_map(|first| {
            seconds
                .iter()
                .map(move |second| (first.clone(), second.clone()))
        })
        .collect()
}

pub fn flatten_kerning(pairs: &BTreeMap<Pair, f64>, groups: &GroupTable) -> BTreeMap<Pair, f64> {
    let mut ranked: Vec<(u8, &Pair, f64)> = pairs
        .iter()
        .map(|(pair, value)| (specificity(groups, pair), pair, *value))
        .collect();
    ranked.sort_by_key(|(rank, _, _)| *rank);

    let mut flat = BTreeMap::new();
    for (_, pair, value) in ranked {
        for glyph_pair in flatten_pair(groups, pair) {
            flat.insert(glyph_pair, value);
        }
    }
    flat
}

fn specificity(groups: &GroupTable, (first, second): &Pair) -> u8 {
    match (groups.contains_key(first), groups.contains_key(second)) {
        (true, true) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    }
}

/// Kerning values change with the table itself and with the groups it names
fn dependencies() -> Dependencies<Kerning> {
    Dependencies::new()
        .on(KerningEvent::Changed)
        .on_related(GroupsEvent::Changed, "groups", |kerning: &Kerning| {
            kerning.groups()
        })
}

fn group_table(kerning: &Kerning) -> GroupTable {
    kerning.groups().map(|groups: Groups| groups.all()).unwrap_or_default()
}

pub(crate) fn declare_flatten_pair(
    builder: &mut RegistryBuilder,
) -> Result<CachedMethod<Kerning, Pair, Vec<Pair>>> {
    builder.font_cached_method("flatten_pair", dependencies(), |_, kerning, pair| {
        Ok(flatten_pair(&group_table(kerning), pair))
    })
}

pub(crate) fn declare_flattened_kerning(
    builder: &mut RegistryBuilder,
) -> Result<CachedProperty<Kerning, FlatKerning>> {
    builder.font_cached_property("flattened_kerning", dependencies(), |_, kerning| {
        let flat = flatten_kerning(&kerning.pairs(), &group_table(kerning));
        log::debug!("flattened {} kerning entries into {} pairs", kerning.len(), flat.len());
        Ok(Arc::new(flat))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(first: &str, second: &str) -> Pair {
        (first.to_string(), second.to_string())
    }

    fn groups() -> GroupTable {
        BTreeMap::from([
            ("A".to_string(), vec!["a".to_string(), "a.alt".to_string()]),
            ("O".to_string(), vec!["o".to_string(), "e".to_string()]),
        ])
    }

    #[test]
    fn group_side_expands_to_members() {
        assert_eq!(
            flatten_pair(&groups(), &pair("A", "b")),
            vec![pair("a", "b"), pair("a.alt", "b")]
        );
        assert_eq!(flatten_pair(&groups(), &pair("x", "y")), vec![pair("x", "y")]);
        assert_eq!(flatten_pair(&groups(), &pair("A", "O")).len(), 4);
    }

    #[test]
    fn empty_group_flattens_to_nothing() {
        let table = BTreeMap::from([("E".to_string(), Vec::new())]);
        assert!(flatten_pair(&table, &pair("E", "b")).is_empty());
    }

    #[test]
    fn specific_pairs_override_group_pairs() {
        let pairs = BTreeMap::from([
            (pair("A", "O"), -10.0),
            (pair("A", "o"), -20.0),
            (pair("a", "O"), -30.0),
            (pair("a", "o"), -40.0),
        ]);
        let flat = flatten_kerning(&pairs, &groups());
        assert_eq!(flat[&pair("a", "o")], -40.0);
        assert_eq!(flat[&pair("a", "e")], -30.0);
        assert_eq!(flat[&pair("a.alt", "o")], -20.0);
        assert_eq!(flat[&pair("a.alt", "e")], -10.0);
        assert_eq!(flat.len(), 4);
    }
}
