//! Database group tree and its flattened name-to-uuid view.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The `get-database-groups` response.
///
/// KeePassXC nests the tree as `groups.groups[0]`, a synthetic root whose
/// children are the first real level of groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseGroups {
    #[serde(default)]
    pub groups: GroupList,
}

/// Wrapper object holding the root group list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupList {
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// A single group node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub uuid: String,
    #[serde(default)]
    pub children: Vec<Group>,
}

impl Group {
    pub fn new(name: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Group>) -> Self {
        self.children = children;
        self
    }
}

impl DatabaseGroups {
    /// Build a response around a single root group.
    pub fn from_root(root: Group) -> Self {
        Self {
            groups: GroupList { groups: vec![root] },
        }
    }

    /// True if the response carries no groups at all.
    pub fn is_empty(&self) -> bool {
        self.groups.groups.is_empty()
    }

    /// The synthetic root group, if any.
    pub fn root(&self) -> Option<&Group> {
        self.groups.groups.first()
    }
}

/// Flatten the group tree into a `name -> uuid` map.
///
/// Visits the root's children in server order, pre-order (a node before its
/// children). Group names are not unique in KeePassXC: when two nodes share a
/// name, the one visited last wins.
pub fn flatten(groups: &DatabaseGroups) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Some(root) = groups.root() {
        traverse(&root.children, &mut map);
    }
    map
}

fn traverse(children: &[Group], map: &mut HashMap<String, String>) {
    for group in children {
        map.insert(group.name.clone(), group.uuid.clone());
        traverse(&group.children, map);
    }
}
