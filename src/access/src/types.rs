//! Core grant types

use crate::error::AccessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role identifier
pub type RoleId = String;

/// Resource identifier
pub type ResourceId = String;

/// Action verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Create,
    Read,
    Update,
    Delete,
    /// `*`, any verb
    All,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Read => "read",
            Verb::Update => "update",
            Verb::Delete => "delete",
            Verb::All => "*",
        }
    }
}

impl FromStr for Verb {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Verb::Create),
            "read" => Ok(Verb::Read),
            "update" => Ok(Verb::Update),
            "delete" => Ok(Verb::Delete),
            "*" => Ok(Verb::All),
            other => Err(AccessError::InvalidAction(format!("unknown verb '{}'", other))),
        }
    }
}

/// Action scope: the subject's own resources or any resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Possession {
    Own,
    Any,
}

impl Possession {
    pub fn as_str(&self) -> &'static str {
        match self {
            Possession::Own => "own",
            Possession::Any => "any",
        }
    }
}

impl FromStr for Possession {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "own" => Ok(Possession::Own),
            "any" => Ok(Possession::Any),
            other => Err(AccessError::InvalidAction(format!("unknown scope '{}'", other))),
        }
    }
}

/// Grant action tag (e.g. `read:any`, `update:own`, `*:any`)
///
/// Closed set of 9 values: the four verbs with an `own` or `any` scope,
/// plus the universal wildcard `*:any`. Serialized in its `verb:scope`
/// text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GrantAction {
    verb: Verb,
    possession: Possession,
}

impl GrantAction {
    pub const CREATE_OWN: GrantAction = GrantAction::new(Verb::Create, Possession::Own);
    pub const CREATE_ANY: GrantAction = GrantAction::new(Verb::Create, Possession::Any);
    pub const READ_OWN: GrantAction = GrantAction::new(Verb::Read, Possession::Own);
    pub const READ_ANY: GrantAction = GrantAction::new(Verb::Read, Possession::Any);
    pub const UPDATE_OWN: GrantAction = GrantAction::new(Verb::Update, Possession::Own);
    pub const UPDATE_ANY: GrantAction = GrantAction::new(Verb::Update, Possession::Any);
    pub const DELETE_OWN: GrantAction = GrantAction::new(Verb::Delete, Possession::Own);
    pub const DELETE_ANY: GrantAction = GrantAction::new(Verb::Delete, Possession::Any);
    /// `*:any`, the broadest possible grant
    pub const ANY: GrantAction = GrantAction::new(Verb::All, Possession::Any);

    /// Every action in the vocabulary
    pub const ALL: [GrantAction; 9] = [
        Self::CREATE_OWN,
        Self::CREATE_ANY,
        Self::READ_OWN,
        Self::READ_ANY,
        Self::UPDATE_OWN,
        Self::UPDATE_ANY,
        Self::DELETE_OWN,
        Self::DELETE_ANY,
        Self::ANY,
    ];

    const fn new(verb: Verb, possession: Possession) -> Self {
        Self { verb, possession }
    }

    /// Build an action from its parts; `*:own` is not part of the vocabulary
    pub fn from_parts(verb: Verb, possession: Possession) -> Result<Self, AccessError> {
        if verb == Verb::All && possession == Possession::Own {
            return Err(AccessError::InvalidAction(
                "'*' verb is only defined with the 'any' scope".to_string(),
            ));
        }

        Ok(Self::new(verb, possession))
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn possession(&self) -> Possession {
        self.possession
    }

    /// Whether a policy registered under `self` grants the `requested` action
    ///
    /// Matches when any of the following holds:
    /// - the actions are identical
    /// - `self` is `*:any`
    /// - `self` has scope `any` and the same verb as `requested`
    /// - `self` has the `*` verb and the same scope as `requested`
    pub fn satisfies(&self, requested: &GrantAction) -> bool {
        if self == requested || *self == Self::ANY {
            return true;
        }

        if self.possession == Possession::Any && self.verb == requested.verb {
            return true;
        }

        self.verb == Verb::All && self.possession == requested.possession
    }
}

impl fmt::Display for GrantAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.verb.as_str(), self.possession.as_str())
    }
}

impl FromStr for GrantAction {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verb, possession) = s
            .split_once(':')
            .ok_or_else(|| AccessError::InvalidAction(format!("expected 'verb:scope', got '{}'", s)))?;

        Self::from_parts(verb.parse()?, possession.parse()?)
    }
}

impl TryFrom<String> for GrantAction {
    type Error = AccessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GrantAction> for String {
    fn from(action: GrantAction) -> Self {
        action.to_string()
    }
}

/// Attribute rule used to project a resource's fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GrantAttribute {
    /// `*`: include every field
    All,
    /// `!name`: exclude the named field
    Exclude(String),
    /// `name`: include the named field
    Include(String),
}

impl GrantAttribute {
    pub fn include(name: impl Into<String>) -> Self {
        GrantAttribute::Include(name.into())
    }

    pub fn exclude(name: impl Into<String>) -> Self {
        GrantAttribute::Exclude(name.into())
    }

    /// Whether this rule adds `field` to the projection
    pub fn includes(&self, field: &str) -> bool {
        match self {
            GrantAttribute::All => true,
            GrantAttribute::Include(name) => name == field,
            GrantAttribute::Exclude(_) => false,
        }
    }

    /// Whether this rule removes `field` from the projection
    pub fn excludes(&self, field: &str) -> bool {
        matches!(self, GrantAttribute::Exclude(name) if name == field)
    }
}

impl From<&str> for GrantAttribute {
    fn from(s: &str) -> Self {
        if s == "*" {
            GrantAttribute::All
        } else if let Some(name) = s.strip_prefix('!') {
            GrantAttribute::Exclude(name.to_string())
        } else {
            GrantAttribute::Include(s.to_string())
        }
    }
}

impl From<String> for GrantAttribute {
    fn from(s: String) -> Self {
        GrantAttribute::from(s.as_str())
    }
}

impl From<GrantAttribute> for String {
    fn from(attribute: GrantAttribute) -> Self {
        attribute.to_string()
    }
}

impl fmt::Display for GrantAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantAttribute::All => write!(f, "*"),
            GrantAttribute::Exclude(name) => write!(f, "!{}", name),
            GrantAttribute::Include(name) => write!(f, "{}", name),
        }
    }
}

/// Metadata attached to a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// Ordered attribute rules
    #[serde(default = "PolicyMetadata::all_attributes")]
    pub attributes: Vec<GrantAttribute>,
}

impl PolicyMetadata {
    /// Metadata with the given attribute rules
    pub fn new<I, A>(attributes: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<GrantAttribute>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    fn all_attributes() -> Vec<GrantAttribute> {
        vec![GrantAttribute::All]
    }
}

impl Default for PolicyMetadata {
    /// Allows every field (`["*"]`)
    fn default() -> Self {
        Self {
            attributes: Self::all_attributes(),
        }
    }
}

/// One action's permission metadata within a grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub action: GrantAction,

    #[serde(default)]
    pub metadata: PolicyMetadata,
}

impl Policy {
    pub fn new(action: GrantAction, metadata: PolicyMetadata) -> Self {
        Self { action, metadata }
    }
}

/// Binding of a role and a resource to a set of action policies
///
/// Policies keep insertion order, which is the only precedence used when
/// resolving a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub role: RoleId,

    pub resource: ResourceId,

    #[serde(default)]
    pub policies: Vec<Policy>,
}

impl Grant {
    pub fn new(role: impl Into<RoleId>, resource: impl Into<ResourceId>) -> Self {
        Self {
            role: role.into(),
            resource: resource.into(),
            policies: Vec::new(),
        }
    }

    /// Add a policy, builder style
    pub fn with_policy(mut self, action: GrantAction, metadata: PolicyMetadata) -> Self {
        self.upsert(action, metadata);
        self
    }

    /// Policy registered for exactly `action`
    pub fn policy(&self, action: GrantAction) -> Option<&Policy> {
        self.policies.iter().find(|p| p.action == action)
    }

    /// Create the policy for `action`, or replace its metadata in place
    pub fn upsert(&mut self, action: GrantAction, metadata: PolicyMetadata) {
        match self.policies.iter_mut().find(|p| p.action == action) {
            Some(policy) => policy.metadata = metadata,
            None => self.policies.push(Policy::new(action, metadata)),
        }
    }
}

/// Outcome of a permission query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResult {
    pub granted: bool,

    /// Metadata of the matching policy, `None` when denied
    pub metadata: Option<PolicyMetadata>,
}

impl PermissionResult {
    pub fn granted(metadata: PolicyMetadata) -> Self {
        Self {
            granted: true,
            metadata: Some(metadata),
        }
    }

    pub fn denied() -> Self {
        Self {
            granted: false,
            metadata: None,
        }
    }

    /// Attribute rules of the matching policy, empty when denied
    pub fn attributes(&self) -> &[GrantAttribute] {
        self.metadata
            .as_ref()
            .map(|m| m.attributes.as_slice())
            .unwrap_or(&[])
    }
}
