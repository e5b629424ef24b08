//! Concurrent saves and reads on one target
//!
//! Readers must see either the whole old grant set or the whole new one,
//! and the last committed save wins.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use common::*;
use grantmatrix::{Mode, PermissionEntry, Permissions};

fn uniform(perms: Permissions) -> Vec<PermissionEntry> {
    [CLIENTS_VIEW, CLIENTS_EDIT, CLIENTS_DELETE, CONTRACTS_VIEW]
        .iter()
        .map(|id| entry(id, perms))
        .collect()
}

/// Verify readers never observe a half-replaced grant set
#[test]
fn no_torn_reads() {
    let (_dir, store) = seeded();
    let all = uniform(p(true, true, true));
    let none = uniform(Permissions::DENY);
    store.save_matrix(&Mode::Role("staff".into()), &all).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            let done = done.clone();
            thread::spawn(move || {
                let actor = store.actor_for("u1").unwrap();
                let mut reads = 0;
                while !done.load(Ordering::Relaxed) || reads == 0 {
                    let grants = store.get_role_grants("staff").unwrap();
                    assert_eq!(grants.len(), 4);
                    let first = grants[0].permissions;
                    let same = grants.iter().all(|g| g.permissions == first);
                    assert!(same, "torn read: {:?}", grants);

                    let all = store.effective_all(&actor).unwrap();
                    assert!(all.iter().all(|(_, p)| *p == all[0].1), "torn resolve: {:?}", all);
                    reads += 1;
                }
            })
        })
        .collect();

    for i in 0..200 {
        let rows = if i % 2 == 0 { &none } else { &all };
        store.save_matrix(&Mode::Role("staff".into()), rows).unwrap();
    }
    done.store(true, Ordering::Relaxed);
    for r in readers {
        r.join().unwrap();
    }

    // 200 saves, the last (i = 199) wrote `all`
    let grants = store.get_role_grants("staff").unwrap();
    assert!(grants.iter().all(|g| g.permissions == p(true, true, true)));
}

/// Verify concurrent writers on one target end with exactly one writer's full set
#[test]
fn last_write_wins() {
    let (_dir, store) = seeded();
    let writers: Vec<_> = (0..8)
        .map(|n| {
            let store = store.clone();
            thread::spawn(move || {
                let perms = if n % 2 == 0 { p(true, false, false) } else { p(false, true, true) };
                for _ in 0..25 {
                    let rows = [
                        override_entry(CLIENTS_VIEW, perms, true),
                        override_entry(CONTRACTS_VIEW, perms, true),
                    ];
                    save_user(&store, "u1", &rows);
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }

    let rows = store.get_user_overrides("u1").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].permissions, rows[1].permissions);
}
