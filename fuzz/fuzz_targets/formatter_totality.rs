#![no_main]

//! Feeds arbitrary JSON through every formatter and the built-in rules.
//!
//! Formatters and filters must never panic, whatever shape the payload has.

use herald_core::{builtin, matcher, Event, FormatOptions, FormatterId};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<Value>(data) else {
        return;
    };

    for id in FormatterId::ALL {
        let _ = id.render(&payload, FormatOptions::default());
        let _ = id.render(&payload, FormatOptions { include_drafts: true });
    }

    let rules = builtin::rules();
    for kind in ["pull_request", "issues", "push", "release"] {
        let event = Event::new(kind, payload.clone());
        let _ = matcher::select(&rules, &event);
    }
});
