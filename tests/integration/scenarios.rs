//! Borrow/return scenarios against the shared services, using real threads

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use elidune_circulation::{
    config::CirculationConfig,
    models::{
        account::CreateAccount,
        item::{CreateItem, ItemEdit},
        LockStatus,
    },
    repository::Repository,
    services::Services,
    AppError,
};

fn services() -> Services {
    Services::new(Repository::new(), &CirculationConfig::default())
}

fn account(services: &Services, username: &str) -> u64 {
    services
        .accounts
        .open_account(&CreateAccount {
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
        })
        .id
}

fn wait_for_stock_waiters(services: &Services, n: usize) {
    for _ in 0..1000 {
        if services.diagnostics.lock_snapshot().stock_waiters == n {
            return;
        }
        thread::sleep(Duration::from_millis(2));
    }
    panic!("expected {} suspended borrows", n);
}

#[test]
fn test_dune_handover() {
    let services = services();
    let id = services.catalog.add_item(&CreateItem {
        title: "Dune".to_string(),
        author: "Herbert".to_string(),
        quantity: 1,
    });
    let a = account(&services, "a");
    let b = account(&services, "b");

    services.loans.borrow("Dune", a, None).unwrap();
    assert_eq!(services.catalog.check_availability("Dune").unwrap().count, 0);

    let waiter = {
        let loans = services.loans.clone();
        thread::spawn(move || loans.borrow("Dune", b, None))
    };
    wait_for_stock_waiters(&services, 1);
    assert!(!waiter.is_finished());

    let returned = services.loans.return_item("Dune", a).unwrap();
    assert_eq!(returned.remaining, 1);

    let borrowed = waiter.join().unwrap().unwrap();
    assert_eq!(borrowed.item_id, id);
    assert_eq!(services.catalog.check_availability("Dune").unwrap().count, 0);
    assert_eq!(services.loans.account_loans(b).unwrap().items, vec![id]);
    assert!(services.loans.account_loans(a).unwrap().items.is_empty());
}

#[test]
fn test_return_without_borrow() {
    let services = services();
    services.catalog.add_item(&CreateItem {
        title: "Dune".to_string(),
        author: "Herbert".to_string(),
        quantity: 1,
    });
    let c = account(&services, "c");

    let result = services.loans.return_item("Dune", c);
    assert!(matches!(result, Err(AppError::NotBorrowedByCaller(_))));
    assert_eq!(services.catalog.check_availability("Dune").unwrap().count, 1);
}

#[test]
fn test_borrow_busy_during_catalog_edit_then_retry() {
    let repository = Repository::new();
    let services = Services::new(repository.clone(), &CirculationConfig::default());
    services.catalog.add_item(&CreateItem {
        title: "Dune".to_string(),
        author: "Herbert".to_string(),
        quantity: 1,
    });
    let a = account(&services, "a");

    // Holds the same catalog write section `CatalogService::update_item`
    // takes, kept open by hand so the borrow lands while the edit is half
    // done. `update_item` itself releases it before returning.
    let (held_tx, held_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let editor = {
        let repository = repository.clone();
        thread::spawn(move || {
            let mut shelf = repository.write_shelf();
            let item = shelf.catalog.find_mut("Dune").unwrap();
            item.author = "Frank Herbert".to_string();
            held_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            item.count = 2;
        })
    };

    held_rx.recv().unwrap();
    assert_eq!(services.diagnostics.lock_status(), LockStatus::Held);
    assert!(matches!(
        services.loans.borrow("Dune", a, None),
        Err(AppError::Busy(_))
    ));

    release_tx.send(()).unwrap();
    editor.join().unwrap();

    let receipt = services.loans.borrow("Dune", a, None).unwrap();
    assert_eq!(receipt.remaining, 1);
    assert_eq!(services.catalog.find_item("Dune").unwrap().author, "Frank Herbert");
}

#[test]
fn test_readers_share_while_writer_queues() {
    let services = services();
    services.catalog.add_item(&CreateItem {
        title: "Dune".to_string(),
        author: "Herbert".to_string(),
        quantity: 5,
    });

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let catalog = services.catalog.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    assert!(catalog.check_availability("Dune").unwrap().count >= 5);
                }
            })
        })
        .collect();

    let writers: Vec<_> = (0..2)
        .map(|n| {
            let catalog = services.catalog.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    catalog.update_item(
                        "Dune",
                        &ItemEdit {
                            title: "Dune".to_string(),
                            author: format!("writer {} pass {}", n, i),
                            quantity: 5 + i,
                        },
                    )
                    .unwrap();
                }
            })
        })
        .collect();

    for handle in readers.into_iter().chain(writers) {
        handle.join().unwrap();
    }
    let snapshot = services.diagnostics.lock_snapshot();
    assert_eq!(snapshot.active_readers, 0);
    assert_eq!(snapshot.waiting_writers, 0);
    assert!(!snapshot.writer_active);
}
