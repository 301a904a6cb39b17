use std::collections::HashSet;

use crate::catalog::CatalogError;
use crate::models::ClassSession;

pub fn validate_session(session: &ClassSession) -> Result<(), CatalogError> {
    if session.capacity == 0 {
        return Err(CatalogError::InvalidSession {
            id: session.id,
            reason: "capacity must be positive".into(),
        });
    }
    if session.enrolled > session.capacity {
        return Err(CatalogError::InvalidSession {
            id: session.id,
            reason: format!(
                "enrolled {} exceeds capacity {}",
                session.enrolled, session.capacity
            ),
        });
    }
    Ok(())
}

pub fn validate_catalog(sessions: &[ClassSession]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for session in sessions {
        validate_session(session)?;
        if !seen.insert(session.id) {
            return Err(CatalogError::DuplicateId(session.id));
        }
    }
    Ok(())
}
