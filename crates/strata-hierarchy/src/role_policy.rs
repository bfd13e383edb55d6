//! Structural rules tying stream roles to type tags and child roles.

use strata_core::errors::FieldViolation;
use strata_core::models::{type_tags, Stream, StreamRole, StreamStatus};

/// Children of these roles must carry the paired type tag.
const REQUIRED_CHILD_TAG: &[(StreamRole, &str)] = &[
    (StreamRole::Contexts, type_tags::CONTEXT),
    (StreamRole::Projects, type_tags::PROJECT),
    (StreamRole::Areas, type_tags::AREA),
];

/// `(parent role, forbidden child role)`. `None` matches any parent that
/// carries a role; role-less containers may hold anything.
const FORBIDDEN_CHILD_ROLES: &[(Option<StreamRole>, StreamRole)] = &[
    (None, StreamRole::Inbox),
    (Some(StreamRole::Contexts), StreamRole::Contexts),
    (Some(StreamRole::NextActions), StreamRole::NextActions),
];

/// Type tag a child of `role` must carry, if any.
pub fn required_child_tag(role: StreamRole) -> Option<&'static str> {
    REQUIRED_CHILD_TAG
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, tag)| *tag)
}

pub fn is_forbidden_child_role(parent_role: Option<StreamRole>, child_role: StreamRole) -> bool {
    FORBIDDEN_CHILD_ROLES
        .iter()
        .any(|(p, c)| {
            *c == child_role
                && match p {
                    None => parent_role.is_some(),
                    Some(_) => *p == parent_role,
                }
        })
}

/// A structural role may not carry a leaf type tag itself.
pub fn check_own(stream: &Stream) -> Option<FieldViolation> {
    match stream.role {
        Some(role) if role.is_structural() && type_tags::is_leaf(&stream.type_tag) => {
            Some(FieldViolation::new(
                "typeTag",
                format!(
                    "{} stream may not carry leaf type tag {}",
                    role, stream.type_tag
                ),
            ))
        }
        _ => None,
    }
}

/// Violations of placing `child` directly under `parent`.
pub fn check_child(parent: &Stream, child: &Stream) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if let Some(tag) = parent.role.and_then(required_child_tag) {
        if !child.type_tag.eq_ignore_ascii_case(tag) {
            violations.push(FieldViolation::new(
                "typeTag",
                format!(
                    "children of a {} stream must carry type tag {tag}, got {}",
                    parent.role.map(|r| r.as_str()).unwrap_or_default(),
                    child.type_tag
                ),
            ));
        }
    }
    if let Some(child_role) = child.role {
        if is_forbidden_child_role(parent.role, child_role) {
            violations.push(FieldViolation::new(
                "role",
                format!(
                    "{child_role} stream may not be placed under {}",
                    parent.role.map(|r| r.as_str()).unwrap_or("a stream")
                ),
            ));
        }
    }
    violations
}

/// An ACTIVE stream may not sit directly under a FROZEN one.
pub fn check_status(parent: &Stream, child: &Stream) -> Option<FieldViolation> {
    (parent.status == StreamStatus::Frozen && child.status == StreamStatus::Active).then(|| {
        FieldViolation::new(
            "parentId",
            format!("{} is FROZEN; unfreeze it before placing active streams under it", parent.id),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::models::NewStream;

    fn make(role: Option<StreamRole>, tag: &str) -> Stream {
        let mut s = NewStream::new("org", "s").with_type_tag(tag);
        s.role = role;
        s.into_stream()
    }

    #[test]
    fn contexts_children_need_context_tag() {
        let parent = make(Some(StreamRole::Contexts), "STREAM");
        assert!(check_child(&parent, &make(None, "CONTEXT")).is_empty());
        let bad = check_child(&parent, &make(None, "STREAM"));
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].path, "typeTag");
    }

    #[test]
    fn inbox_is_never_under_a_role() {
        let parent = make(Some(StreamRole::Custom), "STREAM");
        let bad = check_child(&parent, &make(Some(StreamRole::Inbox), "STREAM"));
        assert_eq!(bad[0].path, "role");
        let container = make(None, "STREAM");
        assert!(check_child(&container, &make(Some(StreamRole::Inbox), "STREAM")).is_empty());
    }

    #[test]
    fn next_actions_may_not_nest() {
        let parent = make(Some(StreamRole::NextActions), "STREAM");
        assert!(!check_child(&parent, &make(Some(StreamRole::NextActions), "STREAM")).is_empty());
        assert!(check_child(&parent, &make(Some(StreamRole::WaitingFor), "STREAM")).is_empty());
    }

    #[test]
    fn frozen_parent_only_takes_frozen_children() {
        let mut parent = make(None, "STREAM");
        parent.status = StreamStatus::Frozen;
        let violation = check_status(&parent, &make(None, "STREAM")).unwrap();
        assert_eq!(violation.path, "parentId");

        let mut child = make(None, "STREAM");
        child.status = StreamStatus::Frozen;
        assert!(check_status(&parent, &child).is_none());
        assert!(check_status(&make(None, "STREAM"), &make(None, "STREAM")).is_none());
    }

    #[test]
    fn structural_role_rejects_leaf_tag() {
        assert!(check_own(&make(Some(StreamRole::Projects), "PROJECT")).is_some());
        assert!(check_own(&make(Some(StreamRole::Custom), "PROJECT")).is_none());
        assert!(check_own(&make(None, "PROJECT")).is_none());
    }
}
