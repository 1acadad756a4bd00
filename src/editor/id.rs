use std::fmt;
use uuid::Uuid;

/// Local token for an entity that only exists in the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftToken(Uuid);

impl DraftToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DraftToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "draft-{}", self.0.simple())
    }
}

/// Identity of a day, exercise or video inside the editor. Only `Persisted`
/// ids ever leave the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityId {
    Persisted(String),
    Draft(DraftToken),
}

impl EntityId {
    pub fn new_draft() -> Self {
        EntityId::Draft(DraftToken::generate())
    }

    pub fn persisted(id: impl Into<String>) -> Self {
        EntityId::Persisted(id.into())
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, EntityId::Draft(_))
    }

    /// The backend id, if this entity has one.
    pub fn as_persisted(&self) -> Option<&str> {
        match self {
            EntityId::Persisted(id) => Some(id),
            EntityId::Draft(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Persisted(id) => f.write_str(id),
            EntityId::Draft(token) => token.fmt(f),
        }
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Persisted(id.to_string())
    }
}
