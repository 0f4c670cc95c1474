//! Derived lookup indices.
//!
//! Two independent passes over a [`DirectorySnapshot`]:
//!
//! - [`build_address_index`]: address → identity, for group addresses,
//!   group aliases and terminal member addresses
//! - [`build_membership_closure`]: terminal member id → every group that
//!   contains it, directly or through nested groups
//!
//! Both are pure and deterministic: the snapshot is an ordered map, so
//! groups are always visited in ascending id order.
//!
//! ## Nesting cycles
//!
//! Upstream directories allow group A to contain group B while B (directly
//! or transitively) contains A. The closure walk tracks every group it has
//! entered for the current outer group. Re-entering a group that is still
//! being expanded is a cycle: the edge is skipped and reported as a
//! [`NestingCycle`] instead of being followed. Re-entering a group that was
//! already fully expanded (a diamond) is skipped silently, since its
//! members are already attributed.

use crate::group::{DirectorySnapshot, Group, GROUP_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Address → identity lookup.
pub type AddressIndex = BTreeMap<String, Identity>;

/// Terminal member id → ids of all groups containing it.
pub type MembershipClosure = BTreeMap<String, BTreeSet<String>>;

/// The identity an address resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Group or member identifier.
    pub id: String,
    /// `GROUP` for groups, the member's declared type otherwise.
    #[serde(rename = "type")]
    pub identity_type: String,
}

impl Identity {
    /// Creates a group identity.
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            identity_type: GROUP_TYPE.to_string(),
        }
    }

    /// Creates an identity with an explicit type.
    pub fn new(id: impl Into<String>, identity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            identity_type: identity_type.into(),
        }
    }

    /// Returns true if this identity is a group.
    pub fn is_group(&self) -> bool {
        self.identity_type == GROUP_TYPE
    }
}

/// A nesting edge skipped because following it would loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestingCycle {
    /// The outer group whose closure was being built.
    pub outer: String,
    /// The group whose member list contains the back edge.
    pub via: String,
    /// The group that was already being expanded.
    pub target: String,
}

/// Result of the membership closure pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureBuild {
    /// The closure index.
    pub closure: MembershipClosure,
    /// Nesting cycles encountered, in discovery order.
    pub cycles: Vec<NestingCycle>,
}

/// Both derived indices for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Indices {
    /// Address → identity.
    pub addresses: AddressIndex,
    /// Member → enclosing groups.
    pub closure: MembershipClosure,
    /// Nesting cycles skipped while building the closure.
    pub cycles: Vec<NestingCycle>,
}

/// Builds both indices for a snapshot.
pub fn build_indices(snapshot: &DirectorySnapshot) -> Indices {
    let ClosureBuild { closure, cycles } = build_membership_closure(snapshot);
    Indices {
        addresses: build_address_index(snapshot),
        closure,
        cycles,
    }
}

/// Builds the address → identity index.
///
/// For each group, in id order: the primary address, then each alias, then
/// the address of every member that is not itself a group of the snapshot.
/// A later write to the same address replaces the earlier one. Empty
/// addresses are skipped.
pub fn build_address_index(snapshot: &DirectorySnapshot) -> AddressIndex {
    let mut index = AddressIndex::new();

    for (group_id, group) in snapshot {
        insert_address(&mut index, &group.email, || Identity::group(group_id));
        for alias in &group.aliases {
            insert_address(&mut index, alias, || Identity::group(group_id));
        }

        for member in group.members.values() {
            // Nested groups are indexed through their own entry.
            if snapshot.contains_key(&member.id) {
                continue;
            }
            insert_address(&mut index, &member.email, || {
                Identity::new(&member.id, &member.member_type)
            });
        }
    }

    index
}

fn insert_address(index: &mut AddressIndex, address: &str, identity: impl FnOnce() -> Identity) {
    if address.is_empty() {
        return;
    }
    index.insert(address.to_string(), identity());
}

/// Walk state of a group while expanding one outer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Builds the terminal member → enclosing groups closure.
pub fn build_membership_closure(snapshot: &DirectorySnapshot) -> ClosureBuild {
    let mut build = ClosureBuild::default();

    for (outer_id, group) in snapshot {
        let mut visits = BTreeMap::new();
        expand(snapshot, outer_id, outer_id, group, &mut visits, &mut build);
    }

    build
}

fn expand<'a>(
    snapshot: &'a DirectorySnapshot,
    outer_id: &str,
    group_id: &'a str,
    group: &'a Group,
    visits: &mut BTreeMap<&'a str, Visit>,
    build: &mut ClosureBuild,
) {
    visits.insert(group_id, Visit::InProgress);

    for member_id in group.members.keys() {
        let Some((nested_id, nested)) = snapshot.get_key_value(member_id) else {
            build
                .closure
                .entry(member_id.clone())
                .or_default()
                .insert(outer_id.to_string());
            continue;
        };

        match visits.get(nested_id.as_str()) {
            None => expand(snapshot, outer_id, nested_id, nested, visits, build),
            Some(Visit::InProgress) => build.cycles.push(NestingCycle {
                outer: outer_id.to_string(),
                via: group_id.to_string(),
                target: nested_id.clone(),
            }),
            Some(Visit::Done) => {}
        }
    }

    visits.insert(group_id, Visit::Done);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Member;
    use proptest::prelude::*;

    fn snapshot_of(groups: Vec<Group>) -> DirectorySnapshot {
        groups.into_iter().map(|g| (g.id.clone(), g)).collect()
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_group_single_user() {
        let snapshot = snapshot_of(vec![
            Group::new("g1", "g1@x").with_member(Member::user("u1", "u1@x"))
        ]);

        let addresses = build_address_index(&snapshot);
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses["g1@x"], Identity::group("g1"));
        assert_eq!(addresses["u1@x"], Identity::new("u1", "USER"));

        let json = serde_json::to_string(&addresses).unwrap();
        assert_eq!(
            json,
            r#"{"g1@x":{"id":"g1","type":"GROUP"},"u1@x":{"id":"u1","type":"USER"}}"#
        );

        let build = build_membership_closure(&snapshot);
        assert_eq!(serde_json::to_string(&build.closure).unwrap(), r#"{"u1":["g1"]}"#);
        assert!(build.cycles.is_empty());
    }

    #[test]
    fn nested_group_is_resolved_not_emitted() {
        let snapshot = snapshot_of(vec![
            Group::new("g1", "g1@x").with_member(Member::group("g2", "g2@x")),
            Group::new("g2", "g2@x").with_member(Member::user("u1", "u1@x")),
        ]);

        let build = build_membership_closure(&snapshot);
        assert!(!build.closure.contains_key("g2"));
        assert_eq!(build.closure["u1"], set(&["g1", "g2"]));
        assert_eq!(build.closure.len(), 1);
    }

    #[test]
    fn deep_nesting_attributes_to_every_outer_group() {
        let snapshot = snapshot_of(vec![
            Group::new("a", "a@x").with_member(Member::group("b", "b@x")),
            Group::new("b", "b@x").with_member(Member::group("c", "c@x")),
            Group::new("c", "c@x").with_member(Member::user("u", "u@x")),
        ]);

        let build = build_membership_closure(&snapshot);
        assert_eq!(build.closure["u"], set(&["a", "b", "c"]));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let snapshot = snapshot_of(vec![
            Group::new("top", "top@x")
                .with_member(Member::group("left", "left@x"))
                .with_member(Member::group("right", "right@x")),
            Group::new("left", "left@x").with_member(Member::group("base", "base@x")),
            Group::new("right", "right@x").with_member(Member::group("base", "base@x")),
            Group::new("base", "base@x").with_member(Member::user("u", "u@x")),
        ]);

        let build = build_membership_closure(&snapshot);
        assert!(build.cycles.is_empty());
        assert_eq!(build.closure["u"], set(&["base", "left", "right", "top"]));
    }

    #[test]
    fn direct_members_are_deduplicated() {
        let snapshot = snapshot_of(vec![
            Group::new("g1", "g1@x")
                .with_member(Member::user("u1", "u1@x"))
                .with_member(Member::group("g2", "g2@x")),
            Group::new("g2", "g2@x").with_member(Member::user("u1", "u1@x")),
        ]);

        let build = build_membership_closure(&snapshot);
        assert_eq!(
            serde_json::to_string(&build.closure).unwrap(),
            r#"{"u1":["g1","g2"]}"#
        );
    }

    #[test]
    fn two_group_cycle_terminates_and_is_reported() {
        let snapshot = snapshot_of(vec![
            Group::new("a", "a@x")
                .with_member(Member::group("b", "b@x"))
                .with_member(Member::user("ua", "ua@x")),
            Group::new("b", "b@x")
                .with_member(Member::group("a", "a@x"))
                .with_member(Member::user("ub", "ub@x")),
        ]);

        let build = build_membership_closure(&snapshot);
        assert_eq!(build.closure["ua"], set(&["a", "b"]));
        assert_eq!(build.closure["ub"], set(&["a", "b"]));
        assert_eq!(
            build.cycles,
            vec![
                NestingCycle {
                    outer: "a".into(),
                    via: "b".into(),
                    target: "a".into(),
                },
                NestingCycle {
                    outer: "b".into(),
                    via: "a".into(),
                    target: "b".into(),
                },
            ]
        );
    }

    #[test]
    fn self_membership_is_a_cycle() {
        let snapshot = snapshot_of(vec![Group::new("a", "a@x")
            .with_member(Member::group("a", "a@x"))
            .with_member(Member::user("u", "u@x"))]);

        let build = build_membership_closure(&snapshot);
        assert_eq!(build.closure["u"], set(&["a"]));
        assert_eq!(build.cycles.len(), 1);
        assert_eq!(build.cycles[0].via, "a");
        assert_eq!(build.cycles[0].target, "a");
    }

    #[test]
    fn later_group_wins_address_collision() {
        // "shared@x" is g1's alias and g2's primary address; g2 is visited last.
        let snapshot = snapshot_of(vec![
            Group::new("g1", "g1@x").with_alias("shared@x"),
            Group::new("g2", "shared@x"),
        ]);

        let addresses = build_address_index(&snapshot);
        assert_eq!(addresses["shared@x"], Identity::group("g2"));
        assert_eq!(addresses["g1@x"], Identity::group("g1"));
    }

    #[test]
    fn member_address_overrides_earlier_group_address() {
        let snapshot = snapshot_of(vec![
            Group::new("g1", "dup@x"),
            Group::new("g2", "g2@x").with_member(Member::user("u9", "dup@x")),
        ]);

        let addresses = build_address_index(&snapshot);
        assert_eq!(addresses["dup@x"], Identity::new("u9", "USER"));
    }

    #[test]
    fn nested_group_member_entry_is_not_indexed_as_member() {
        let snapshot = snapshot_of(vec![
            Group::new("g1", "g1@x").with_member(Member::group("g2", "nested-entry@x")),
            Group::new("g2", "g2@x"),
        ]);

        let addresses = build_address_index(&snapshot);
        assert!(!addresses.contains_key("nested-entry@x"));
        assert!(addresses["g2@x"].is_group());
    }

    #[test]
    fn foreign_group_member_keeps_declared_type() {
        // A group outside the snapshot is a terminal member.
        let snapshot = snapshot_of(vec![
            Group::new("g1", "g1@x").with_member(Member::group("ext", "ext@other"))
        ]);

        let addresses = build_address_index(&snapshot);
        assert_eq!(addresses["ext@other"], Identity::group("ext"));

        let build = build_membership_closure(&snapshot);
        assert_eq!(build.closure["ext"], set(&["g1"]));
    }

    #[test]
    fn empty_addresses_are_skipped() {
        let snapshot = snapshot_of(vec![
            Group::new("g1", "").with_member(Member::user("u1", ""))
        ]);

        assert!(build_address_index(&snapshot).is_empty());
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let snapshot = snapshot_of(vec![
            Group::new("g1", "g1@x")
                .with_alias("one@x")
                .with_member(Member::group("g2", "g2@x")),
            Group::new("g2", "g2@x").with_member(Member::user("u1", "u1@x")),
        ]);

        assert_eq!(build_indices(&snapshot), build_indices(&snapshot));
    }

    /// Random acyclic snapshots: group `i` may only nest groups with a
    /// larger index.
    fn acyclic_snapshot() -> impl Strategy<Value = DirectorySnapshot> {
        (1usize..6, 1usize..8).prop_flat_map(|(groups, users)| {
            prop::collection::vec(
                (
                    prop::collection::btree_set(0..users, 0..=users / 2 + 1),
                    prop::collection::btree_set(0..groups, 0..=groups / 2 + 1),
                ),
                groups,
            )
            .prop_map(move |specs| {
                let mut snapshot = DirectorySnapshot::new();
                for (i, (user_ids, nested_ids)) in specs.into_iter().enumerate() {
                    let mut group = Group::new(format!("g{i}"), format!("g{i}@x"));
                    for u in user_ids {
                        group = group.with_member(Member::user(format!("u{u}"), format!("u{u}@x")));
                    }
                    for n in nested_ids.into_iter().filter(|n| *n > i) {
                        group = group.with_member(Member::group(format!("g{n}"), format!("g{n}@x")));
                    }
                    snapshot.insert(format!("g{i}"), group);
                }
                snapshot
            })
        })
    }

    /// Straightforward reachability used as a reference.
    fn reachable_terminals(snapshot: &DirectorySnapshot, outer: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![outer.to_string()];
        let mut terminals = BTreeSet::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            for member_id in snapshot[&id].members.keys() {
                if snapshot.contains_key(member_id) {
                    stack.push(member_id.clone());
                } else {
                    terminals.insert(member_id.clone());
                }
            }
        }
        terminals
    }

    proptest! {
        #[test]
        fn every_address_resolves_to_a_known_identity(snapshot in acyclic_snapshot()) {
            let addresses = build_address_index(&snapshot);
            for identity in addresses.values() {
                if identity.is_group() && snapshot.contains_key(&identity.id) {
                    continue;
                }
                let known_member = snapshot
                    .values()
                    .any(|g| g.members.contains_key(&identity.id));
                prop_assert!(known_member, "unknown identity {:?}", identity);
            }
        }

        #[test]
        fn closure_matches_reachability(snapshot in acyclic_snapshot()) {
            let build = build_membership_closure(&snapshot);
            prop_assert!(build.cycles.is_empty());

            let mut expected = MembershipClosure::new();
            for outer in snapshot.keys() {
                for member in reachable_terminals(&snapshot, outer) {
                    expected.entry(member).or_default().insert(outer.clone());
                }
            }
            prop_assert_eq!(build.closure, expected);
        }
    }
}
