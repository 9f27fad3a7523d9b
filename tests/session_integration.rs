//! Session state integration tests
//!
//! Name filter properties and persistence of the memory document across
//! sessions.

use std::time::Duration;

use proptest::prelude::*;

use herald::command::Router;
use herald::session::filter::{is_name_acceptable, normalize};
use herald::session::{SessionContext, Storage};

const BLOCKED: [&str; 6] = ["fuck", "shit", "bitch", "cunt", "whore", "twat"];

/// Rewrite letters with their digit/symbol look-alikes
fn leet(word: &str, mask: u32) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| {
            if mask & (1 << (i % 32)) == 0 {
                return c;
            }
            match c {
                'o' => '0',
                'i' => '1',
                'e' => '3',
                'a' => '4',
                's' => '$',
                't' => '7',
                'b' => '8',
                'g' => '9',
                other => other,
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn verdict_is_deterministic(name in "\\PC{0,24}") {
        prop_assert_eq!(is_name_acceptable(&name), is_name_acceptable(&name));
    }

    #[test]
    fn verdict_ignores_ascii_case(name in "[a-zA-Z ]{0,20}") {
        prop_assert_eq!(is_name_acceptable(&name), is_name_acceptable(&name.to_ascii_uppercase()));
    }

    #[test]
    fn embedded_terms_are_rejected(
        prefix in "[a-z]{0,6}",
        idx in 0usize..BLOCKED.len(),
        suffix in "[a-z]{0,6}",
        mask in any::<u32>(),
    ) {
        let name = format!("{}{}{}", prefix, leet(BLOCKED[idx], mask), suffix);
        prop_assert!(!is_name_acceptable(&name), "{} was accepted", name);
    }

    #[test]
    fn look_alikes_normalize_to_the_plain_word(word in "[a-z]{1,12}", mask in any::<u32>()) {
        prop_assert_eq!(normalize(&leet(&word, mask)), word.clone());
        prop_assert_eq!(is_name_acceptable(&leet(&word, mask)), is_name_acceptable(&word));
    }
}

#[tokio::test]
async fn test_memory_document_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::standard(None, Duration::from_secs(1));

    {
        let mut ctx = SessionContext::open(Storage::new(dir.path())).unwrap();
        router.dispatch(&mut ctx, "my name is Marcus").await;
        router.dispatch(&mut ctx, "what time is it").await;
        ctx.flush().unwrap();
    }

    let ctx = SessionContext::open(Storage::new(dir.path())).unwrap();
    assert_eq!(ctx.profile.display_name(), Some("Marcus"));
    assert_eq!(ctx.memory.interaction_count, 2);
    assert_eq!(ctx.memory.len(), 2);
    assert_eq!(
        ctx.memory.learned_commands.get("what time is it").map(String::as_str),
        Some("time")
    );
    assert!(dir.path().join("config.toml").exists());
}

#[tokio::test]
async fn test_custom_commands_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::standard(None, Duration::from_secs(1));

    {
        let mut ctx = SessionContext::open(Storage::new(dir.path())).unwrap();
        router
            .dispatch(&mut ctx, "when I say lights out, say Sleep well")
            .await;
    }

    let mut ctx = SessionContext::open(Storage::new(dir.path())).unwrap();
    let reply = router.dispatch(&mut ctx, "Lights out").await;
    assert_eq!(reply.lines, vec!["Sleep well".to_string()]);
}
