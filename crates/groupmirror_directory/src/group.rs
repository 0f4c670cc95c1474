//! Group and member records.
//!
//! These mirror the upstream directory's JSON shape. Every field is
//! omitted from the serialized form when it is empty, so a persisted
//! snapshot never contains `null` or `""` values.

use crate::error::DirectoryResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type tag the upstream directory uses for group identities.
pub const GROUP_TYPE: &str = "GROUP";

/// The complete raw directory: group identifier to group.
///
/// Ordered so that every pass over a snapshot visits groups in the same
/// sequence.
pub type DirectorySnapshot = BTreeMap<String, Group>;

/// A member entry of a group.
///
/// The member may be a terminal identity (a user) or another group, in
/// which case `member_type` is [`GROUP_TYPE`] and `id` is that group's id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Member address.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// Upstream entity tag.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub etag: String,
    /// Membership role (`OWNER`, `MANAGER`, `MEMBER`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    /// Account status (`ACTIVE`, `SUSPENDED`, ...).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// Member type (`USER`, `GROUP`, `CUSTOMER`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub member_type: String,
}

impl Member {
    /// Creates a member with an id, address and type.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        member_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            member_type: member_type.into(),
            ..Self::default()
        }
    }

    /// Creates a user member.
    pub fn user(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(id, email, "USER")
    }

    /// Creates a member entry that refers to another group.
    pub fn group(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(id, email, GROUP_TYPE)
    }

    /// Sets the role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

/// A directory group with its resolved member set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Primary address.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// Upstream entity tag.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub etag: String,
    /// Alias addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Members keyed by member identifier.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub members: BTreeMap<String, Member>,
}

impl Group {
    /// Creates a group with an id and primary address.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an alias address.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds a member, replacing any existing entry with the same id.
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.insert(member.id.clone(), member);
        self
    }
}

/// Counts member entries across all groups, without deduplication.
///
/// A user in two groups counts twice, and nested group entries count too.
pub fn count_members(snapshot: &DirectorySnapshot) -> usize {
    snapshot.values().map(|group| group.members.len()).sum()
}

/// Decodes a snapshot from its persisted JSON form.
pub fn snapshot_from_json(data: &[u8]) -> DirectoryResult<DirectorySnapshot> {
    Ok(serde_json::from_slice(data)?)
}

/// Encodes a snapshot to its persisted JSON form.
pub fn snapshot_to_json(snapshot: &DirectorySnapshot) -> DirectoryResult<Vec<u8>> {
    Ok(serde_json::to_vec(snapshot)?)
}
