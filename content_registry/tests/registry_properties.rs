//! Registry behaviour tests
//!
//! Exercises the public store API end to end:
//! - Admin-only entry points refuse everyone else and change nothing
//! - Submission validation, pause handling and sequential ids
//! - Flag deduplication and the automatic flag threshold
//! - Status overrides and read accessors on missing records

use content_registry::{ContentEvent, ContentRegistry, ContractState};
use content_registry_integrity::{
    AgentId, Category, ContentMetadata, ContentStatus, RegistryError, FLAG_THRESHOLD,
    MAX_FLAGGERS,
};

fn admin() -> AgentId {
    AgentId::new("ST1ADMIN")
}

fn user(n: usize) -> AgentId {
    AgentId::new(format!("ST2USER{n}"))
}

fn fresh() -> ContentRegistry {
    ContentRegistry::new(ContractState::new(admin()))
}

fn valid_meta() -> ContentMetadata {
    ContentMetadata::new("https://example.org/story", 1_700_000_000, "politics")
}

fn with_one_record() -> (ContentRegistry, u64) {
    let mut reg = fresh();
    let id = reg.submit_content(&user(0), "QmStory", valid_meta()).unwrap();
    reg.take_events();
    (reg, id)
}

// =============================================================================
// Authorization
// =============================================================================

#[test]
fn test_non_admin_cannot_use_admin_entry_points() {
    let (mut reg, id) = with_one_record();
    let before = reg.snapshot();

    for n in 1..5 {
        let caller = user(n);
        assert_eq!(
            reg.transfer_admin(&caller, caller.clone()),
            Err(RegistryError::NotAuthorized)
        );
        assert_eq!(
            reg.set_paused(&caller, true),
            Err(RegistryError::NotAuthorized)
        );
        assert_eq!(
            reg.update_status(&caller, id, "verified"),
            Err(RegistryError::NotAuthorized)
        );
    }

    assert_eq!(reg.snapshot(), before);
    assert!(reg.pending_events().is_empty());
}

#[test]
fn test_set_paused_returns_new_value() {
    let mut reg = fresh();
    assert_eq!(reg.set_paused(&admin(), true), Ok(true));
    assert!(reg.is_paused());
    assert_eq!(reg.set_paused(&admin(), false), Ok(false));
    assert!(!reg.is_paused());
}

// =============================================================================
// Submission
// =============================================================================

#[test]
fn test_sequential_ids_from_one() {
    let mut reg = fresh();
    assert_eq!(reg.get_next_id(), 1);

    for expected in 1..=3u64 {
        let id = reg
            .submit_content(&user(1), format!("Qm{expected}"), valid_meta())
            .unwrap();
        assert_eq!(id, expected);

        let record = reg.get_content(id).unwrap();
        assert_eq!(record.status, ContentStatus::Pending);
        assert_eq!(record.flag_count, 0);
        assert_eq!(record.category, Category::Politics);
    }
    assert_eq!(reg.get_next_id(), 4);
}

#[test]
fn test_unknown_category_leaves_counter_alone() {
    let mut reg = fresh();
    for category in ["weather", "POLITICS", "tech", "other "] {
        let meta = ContentMetadata::new("src", 1, category);
        assert_eq!(
            reg.submit_content(&user(1), "QmX", meta),
            Err(RegistryError::InvalidCategory)
        );
    }
    assert_eq!(reg.get_next_id(), 1);
    assert_eq!(reg.content_count(), 0);
}

#[test]
fn test_every_category_accepted() {
    let mut reg = fresh();
    for category in Category::all() {
        let meta = ContentMetadata::new("src", 1, category.as_str());
        let id = reg.submit_content(&user(1), "QmX", meta).unwrap();
        assert_eq!(reg.get_content(id).unwrap().category, category);
    }
}

#[test]
fn test_paused_refuses_submissions() {
    let mut reg = fresh();
    reg.set_paused(&admin(), true).unwrap();

    assert_eq!(
        reg.submit_content(&user(1), "QmX", valid_meta()),
        Err(RegistryError::Paused)
    );
    assert_eq!(reg.get_next_id(), 1);

    reg.set_paused(&admin(), false).unwrap();
    assert_eq!(reg.submit_content(&user(1), "QmX", valid_meta()), Ok(1));
}

#[test]
fn test_submission_validation_errors() {
    let mut reg = fresh();
    let cases = [
        ("", valid_meta(), RegistryError::InvalidHash),
        (
            "QmX",
            ContentMetadata::new("", 1, "health"),
            RegistryError::InvalidMetadata,
        ),
        (
            "QmX",
            ContentMetadata::new("src", 0, "health"),
            RegistryError::InvalidMetadata,
        ),
        (
            "QmX",
            ContentMetadata::new("src", 1, ""),
            RegistryError::InvalidMetadata,
        ),
        (
            "QmX",
            ContentMetadata::new("s".repeat(129), 1, "health"),
            RegistryError::StringTooLong,
        ),
    ];

    for (hash, meta, expected) in cases {
        assert_eq!(reg.submit_content(&user(1), hash, meta), Err(expected));
    }
    assert_eq!(reg.get_next_id(), 1);
}

// =============================================================================
// Flagging
// =============================================================================

#[test]
fn test_double_flag_rejected() {
    let (mut reg, id) = with_one_record();

    assert_eq!(reg.flag_content(&user(1), id), Ok(true));
    assert_eq!(
        reg.flag_content(&user(1), id),
        Err(RegistryError::AlreadyFlagged)
    );
    assert_eq!(reg.get_flag_count(id), Ok(1));
    assert!(reg.has_flagged(id, &user(1)));
    assert!(!reg.has_flagged(id, &user(2)));
}

#[test]
fn test_threshold_moves_to_flagged() {
    let (mut reg, id) = with_one_record();

    for n in 1..FLAG_THRESHOLD as usize {
        reg.flag_content(&user(n), id).unwrap();
        assert_eq!(reg.get_content_status(id), Ok(ContentStatus::Pending));
    }

    reg.flag_content(&user(FLAG_THRESHOLD as usize), id).unwrap();
    assert_eq!(reg.get_flag_count(id), Ok(5));
    assert_eq!(reg.get_content_status(id), Ok(ContentStatus::Flagged));

    // A sixth distinct flagger still counts; status stays put.
    reg.flag_content(&user(6), id).unwrap();
    assert_eq!(reg.get_flag_count(id), Ok(6));
    assert_eq!(reg.get_content_status(id), Ok(ContentStatus::Flagged));
}

#[test]
fn test_flag_emits_event_per_flagger() {
    let (mut reg, id) = with_one_record();
    reg.flag_content(&user(1), id).unwrap();
    reg.flag_content(&user(2), id).unwrap();

    assert_eq!(
        reg.take_events(),
        vec![
            ContentEvent::ContentFlagged {
                content_id: id,
                flagger: user(1),
            },
            ContentEvent::ContentFlagged {
                content_id: id,
                flagger: user(2),
            },
        ]
    );
}

#[test]
fn test_flag_missing_and_paused() {
    let (mut reg, id) = with_one_record();
    assert_eq!(
        reg.flag_content(&user(1), id + 1),
        Err(RegistryError::ContentNotFound)
    );

    reg.set_paused(&admin(), true).unwrap();
    assert_eq!(reg.flag_content(&user(1), id), Err(RegistryError::Paused));
    assert_eq!(reg.get_flag_count(id), Ok(0));
}

#[test]
fn test_flagger_capacity_fails_closed() {
    let (mut reg, id) = with_one_record();
    for n in 0..MAX_FLAGGERS {
        reg.flag_content(&user(1000 + n), id).unwrap();
    }
    assert_eq!(reg.get_flag_count(id), Ok(MAX_FLAGGERS as u32));

    let late = user(5000);
    assert_eq!(
        reg.flag_content(&late, id),
        Err(RegistryError::FlaggerOverflow)
    );
    assert_eq!(reg.get_flag_count(id), Ok(MAX_FLAGGERS as u32));
    assert!(!reg.has_flagged(id, &late));
}

// =============================================================================
// Status updates and accessors
// =============================================================================

#[test]
fn test_invalid_status_leaves_record_untouched() {
    let (mut reg, id) = with_one_record();
    let before = reg.get_content(id).cloned();

    for bogus in ["", "archived", "Verified", "approved"] {
        assert_eq!(
            reg.update_status(&admin(), id, bogus),
            Err(RegistryError::InvalidStatus)
        );
    }
    assert_eq!(reg.get_content(id).cloned(), before);
}

#[test]
fn test_update_status_emits_event() {
    let (mut reg, id) = with_one_record();
    assert_eq!(reg.update_status(&admin(), id, "verified"), Ok(true));
    assert_eq!(
        reg.take_events(),
        vec![ContentEvent::StatusChanged {
            content_id: id,
            new_status: ContentStatus::Verified,
        }]
    );
}

#[test]
fn test_missing_record_accessors() {
    let reg = fresh();
    assert_eq!(reg.get_content_status(1), Err(RegistryError::ContentNotFound));
    assert_eq!(reg.get_flag_count(1), Err(RegistryError::ContentNotFound));
    assert!(reg.get_content(1).is_none());
    assert!(!reg.has_flagged(1, &user(1)));
}

#[test]
fn test_immutable_fields_survive_mutation() {
    let (mut reg, id) = with_one_record();
    let original = reg.get_content(id).cloned().unwrap();

    reg.flag_content(&user(1), id).unwrap();
    reg.update_status(&admin(), id, "rejected").unwrap();

    let now = reg.get_content(id).unwrap();
    assert_eq!(now.hash, original.hash);
    assert_eq!(now.submitter, original.submitter);
    assert_eq!(now.source, original.source);
    assert_eq!(now.timestamp, original.timestamp);
    assert_eq!(now.category, original.category);
    assert_eq!(now.submit_time, original.submit_time);
}
