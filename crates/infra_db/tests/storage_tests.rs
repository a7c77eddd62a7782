//! Tests for the file-backed storage adapters

use std::collections::HashSet;
use std::sync::Arc;

use core_kernel::{FixedClock, PortError};
use domain_invoicing::{
    CounterStore, ExchangeFormat, InvoiceNumberAllocator, InvoicingService, SequenceKey,
};
use infra_db::{JsonDirectoryStore, JsonFileCounterStore};
use test_utils::{ClientFixtures, CompanyFixtures, DateFixtures};

// ============================================================================
// Counter File Tests
// ============================================================================

mod counter_file {
    use super::*;

    #[tokio::test]
    async fn test_counters_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");
        let company = CompanyFixtures::initech();

        {
            let store = Arc::new(JsonFileCounterStore::open(&path).await.unwrap());
            let allocator = InvoiceNumberAllocator::new(store);
            allocator.register(&company).await.unwrap();
            assert_eq!(allocator.allocate_next(&company).await.unwrap().as_str(), "INV-0001");
            assert_eq!(allocator.allocate_next(&company).await.unwrap().as_str(), "INV-0002");
        }

        let store = Arc::new(JsonFileCounterStore::open(&path).await.unwrap());
        let allocator = InvoiceNumberAllocator::new(store);
        allocator.register(&company).await.unwrap();
        assert_eq!(allocator.peek_next(&company).await.unwrap().as_str(), "INV-0003");
        assert_eq!(allocator.allocate_next(&company).await.unwrap().as_str(), "INV-0003");
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCounterStore::open(dir.path().join("absent.json")).await.unwrap();
        let key = SequenceKey::invoices(CompanyFixtures::initech_id());
        let err = store.reserve(&key).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!dir.path().join("absent.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileCounterStore::open(&path).await.unwrap_err();
        assert!(matches!(err, PortError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_register_keeps_value_and_updates_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCounterStore::open(dir.path().join("counters.json")).await.unwrap();
        let key = SequenceKey::invoices(CompanyFixtures::initech_id());

        store.register(&key, "INV").await.unwrap();
        store.reserve(&key).await.unwrap();
        let state = store.register(&key, "BILL").await.unwrap();
        assert_eq!(state.prefix, "BILL");
        assert_eq!(state.next, 2);
    }

    #[tokio::test]
    async fn test_tenants_have_independent_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileCounterStore::open(dir.path().join("counters.json")).await.unwrap());
        let allocator = InvoiceNumberAllocator::new(store);
        let initech = CompanyFixtures::initech();
        let globex = CompanyFixtures::globex();
        allocator.register(&initech).await.unwrap();
        allocator.register(&globex).await.unwrap();

        allocator.allocate_next(&initech).await.unwrap();
        allocator.allocate_next(&initech).await.unwrap();
        assert_eq!(allocator.allocate_next(&globex).await.unwrap().as_str(), "INV-0001");
    }

    #[tokio::test]
    async fn test_concurrent_reservations_are_distinct_and_gap_free() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileCounterStore::open(dir.path().join("counters.json")).await.unwrap());
        let allocator = InvoiceNumberAllocator::new(store);
        let company = CompanyFixtures::initech();
        allocator.register(&company).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let allocator = allocator.clone();
            let company = company.clone();
            handles.push(tokio::spawn(async move {
                allocator.allocate_next(&company).await.unwrap()
            }));
        }
        let mut numbers = HashSet::new();
        for handle in handles {
            numbers.insert(handle.await.unwrap().as_str().to_string());
        }

        let expected: HashSet<String> = (1..=16).map(|n| format!("INV-{:04}", n)).collect();
        assert_eq!(numbers, expected);
        assert_eq!(allocator.peek_next(&company).await.unwrap().as_str(), "INV-0017");
    }

    #[tokio::test]
    async fn test_two_handles_share_one_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");
        let key = SequenceKey::invoices(CompanyFixtures::initech_id());

        let first = JsonFileCounterStore::open(&path).await.unwrap();
        first.register(&key, "INV").await.unwrap();
        let second = JsonFileCounterStore::open(&path).await.unwrap();

        let a = first.reserve(&key).await.unwrap();
        let b = second.reserve(&key).await.unwrap();
        assert_eq!(a.next, 1);
        assert_eq!(b.next, 2);
        assert_eq!(first.peek(&key).await.unwrap().next, 3);
    }

    #[tokio::test]
    async fn test_interleaved_handles_never_repeat_a_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");
        let company = CompanyFixtures::initech();

        let left = InvoiceNumberAllocator::new(Arc::new(JsonFileCounterStore::open(&path).await.unwrap()));
        let right = InvoiceNumberAllocator::new(Arc::new(JsonFileCounterStore::open(&path).await.unwrap()));
        left.register(&company).await.unwrap();
        right.register(&company).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let allocator = if i % 2 == 0 { left.clone() } else { right.clone() };
            let company = company.clone();
            handles.push(tokio::spawn(async move {
                allocator.allocate_next(&company).await.unwrap()
            }));
        }
        let mut numbers = HashSet::new();
        for handle in handles {
            numbers.insert(handle.await.unwrap().as_str().to_string());
        }

        let expected: HashSet<String> = (1..=16).map(|n| format!("INV-{:04}", n)).collect();
        assert_eq!(numbers, expected);
    }
}

// ============================================================================
// Client Directory File Tests
// ============================================================================

mod directory_file {
    use super::*;

    async fn service(dir: &std::path::Path) -> InvoicingService<JsonFileCounterStore> {
        let store = Arc::new(JsonFileCounterStore::open(dir.join("counters.json")).await.unwrap());
        InvoicingService::new(
            CompanyFixtures::initech(),
            store,
            Arc::new(FixedClock::on(DateFixtures::issue_date())),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_directory_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(dir.path());
        let service = service(dir.path()).await;

        let mut directory = store.load(CompanyFixtures::initech_id()).unwrap();
        assert!(directory.is_empty());
        let added = service.add_client(&mut directory, ClientFixtures::acme_input()).await.unwrap();
        assert_eq!(added.client_number.as_deref(), Some("CL-001"));
        store.save(&directory).unwrap();

        let reloaded = store.load(CompanyFixtures::initech_id()).unwrap();
        assert_eq!(reloaded, directory);
        assert!(reloaded.find_by_email("AP@ACME.TEST").is_some());
    }

    #[tokio::test]
    async fn test_client_numbers_continue_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(dir.path());

        {
            let service = service(dir.path()).await;
            let mut directory = store.load(CompanyFixtures::initech_id()).unwrap();
            service.add_client(&mut directory, ClientFixtures::acme_input()).await.unwrap();
            store.save(&directory).unwrap();
        }

        let service = service(dir.path()).await;
        let mut directory = store.load(CompanyFixtures::initech_id()).unwrap();
        let second = service
            .add_client(&mut directory, ClientFixtures::umbrella_input())
            .await
            .unwrap();
        assert_eq!(second.client_number.as_deref(), Some("CL-002"));
    }

    #[tokio::test]
    async fn test_import_then_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(dir.path());
        let service = service(dir.path()).await;

        let mut source = store.load(CompanyFixtures::initech_id()).unwrap();
        service.add_client(&mut source, ClientFixtures::acme_input()).await.unwrap();
        service.add_client(&mut source, ClientFixtures::umbrella_input()).await.unwrap();
        let csv = source.export(ExchangeFormat::Csv).unwrap();

        let mut target = domain_invoicing::ClientDirectory::new(CompanyFixtures::globex().id);
        let globex = InvoicingService::new(
            CompanyFixtures::globex(),
            Arc::new(JsonFileCounterStore::open(dir.path().join("counters.json")).await.unwrap()),
            Arc::new(FixedClock::on(DateFixtures::issue_date())),
        )
        .await
        .unwrap();
        assert_eq!(globex.import_clients(&mut target, &csv, ExchangeFormat::Csv).await.unwrap(), 2);
        store.save(&target).unwrap();

        assert_eq!(store.load(CompanyFixtures::globex().id).unwrap().len(), 2);
    }

    #[test]
    fn test_foreign_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(dir.path());
        let globex = domain_invoicing::ClientDirectory::new(CompanyFixtures::globex().id);
        let bytes = serde_json::to_vec(&globex).unwrap();
        std::fs::write(store.path_for(CompanyFixtures::initech_id()), bytes).unwrap();

        assert!(store.load(CompanyFixtures::initech_id()).is_err());
    }
}
