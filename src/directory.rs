use std::collections::HashMap;

use crate::session::Session;

/// Participant id to display name for everyone in the session.
///
/// The local user is inserted last so its own name always wins over
/// whatever the roster reports for the same id. Empty names are left out,
/// so those participants count as unresolved.
pub fn participants_map(session: Option<&Session>) -> HashMap<String, String> {
    let Some(session) = session else {
        return HashMap::new();
    };

    let mut names: HashMap<String, String> = session
        .roster()
        .iter()
        .map(|p| (p.id.clone(), p.display_name.clone()))
        .collect();

    names.insert(
        session.local_user_id().to_string(),
        session.local_name().to_string(),
    );
    names.retain(|_, name| !name.is_empty());

    names
}
