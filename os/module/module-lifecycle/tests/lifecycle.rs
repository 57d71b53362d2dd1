mod common;

use common::{CONSOLE, MockFips, MockLibrary, capture_log, profile};
use core::time::Duration;
use kernel_host::kernel_symbols;
use kernel_printk::KernLevel;
use module_lifecycle::{
    ActivationError, BuildProfile, Errno, IntegrityError, LibStatus, LibraryFlavor,
    ModuleLifecycle, ModuleState, Pause, SelfTestFailure,
};
use module_redirect::{BuildError, Capabilities, Capability, Slot, SymbolSources, TableCell};
use std::cell::RefCell;
use std::rc::Rc;

type Pauses = Rc<RefCell<Vec<Duration>>>;

fn recorder() -> (Pauses, impl Pause) {
    let pauses: Pauses = Rc::default();
    let sink = Rc::clone(&pauses);
    (pauses, move |d: Duration| sink.borrow_mut().push(d))
}

fn lifecycle(
    table: &TableCell,
    library: MockLibrary,
    profile: BuildProfile,
) -> ModuleLifecycle<'_, MockLibrary> {
    ModuleLifecycle::new(
        library,
        profile,
        table,
        SymbolSources::new(kernel_symbols()),
    )
}

#[test]
fn scenario_a_everything_succeeds() {
    let _log = capture_log();
    let table = TableCell::new();
    let (pauses, pause) = recorder();

    let mut library = MockLibrary::new();
    library.homepage = Some("https://mockcrypt.example/");
    let mut module = lifecycle(&table, library, profile())
        .with_fips(MockFips::new())
        .with_pause(pause);

    assert_eq!(module.activate(), Ok(()));
    assert_eq!(module.state(), ModuleState::Active);

    let lib = module.library();
    assert_eq!(lib.init_calls, 1);
    assert_eq!(lib.self_test_calls, 1);
    assert_eq!(lib.cleanup_calls, 0);
    assert_eq!(lib.saw_table, Some(true));
    assert!(module.table().is_some());
    assert_eq!(module.fips().map(|f| f.validation_runs), Some(1));
    assert!(pauses.borrow().is_empty());

    assert!(CONSOLE.contains("mockcrypt FIPS [ready] POST succeeded."));
    assert!(CONSOLE.contains("mockcrypt self-test passed."));
    assert!(CONSOLE.contains(
        "mockcrypt 5.7.2 loaded. See https://mockcrypt.example/ for information."
    ));
    assert!(CONSOLE.contains("Copyright (C) 2006-2024 Mock Crypto Inc."));
    assert_eq!(CONSOLE.count_at_least(KernLevel::Err), 0);
}

#[test]
fn scenario_b_self_test_failure_rolls_back_init() {
    let _log = capture_log();
    let table = TableCell::new();
    let (pauses, pause) = recorder();

    let mut library = MockLibrary::new();
    library.self_test_result = SelfTestFailure::check(-5);

    let mut module = lifecycle(&table, library, profile())
        .with_fips(MockFips::new())
        .with_pause(pause);

    let err = module.activate().expect_err("self-test failure aborts activation");
    assert_eq!(err, ActivationError::SelfTest(SelfTestFailure::at(5)));
    assert_eq!(err.errno(), Errno::Canceled);
    assert_eq!(err.host_code(), -125);
    assert_eq!(module.state(), ModuleState::Failed);

    let lib = module.library();
    assert_eq!(lib.init_calls, 1);
    assert_eq!(lib.cleanup_calls, 1);
    assert_eq!(*pauses.borrow(), [BuildProfile::FLUSH_DELAY]);
    assert_eq!(BuildProfile::FLUSH_DELAY, Duration::from_millis(10));

    assert!(CONSOLE.contains("self-test failed with return code -5."));
    assert!(CONSOLE.contains("mockcrypt 5.7.2 cleanup complete."));
    assert!(!CONSOLE.contains("loaded."));
}

#[test]
fn most_negative_self_test_code_is_canceled_and_rolled_back() {
    let _log = capture_log();
    let table = TableCell::new();
    let (pauses, pause) = recorder();

    let mut library = MockLibrary::new();
    library.self_test_result = SelfTestFailure::check(i32::MIN);

    let mut module = lifecycle(&table, library, profile().with_integrity(false)).with_pause(pause);

    let err = module.activate().expect_err("self-test failure aborts activation");
    assert_eq!(err.host_code(), -125);
    assert_eq!(module.library().cleanup_calls, 1);
    assert_eq!(pauses.borrow().len(), 1);
    assert!(CONSOLE.contains("self-test failed with return code -2147483648."));
}

#[test]
fn scenario_c_in_core_hash_mismatch() {
    let _log = capture_log();
    let table = TableCell::new();
    let hash = "3F5C1AB2E07D9E4C66A1B0F2D8C4E7A9";

    let mut module = lifecycle(&table, MockLibrary::new(), profile()).with_fips(
        MockFips::failing(LibStatus::IN_CORE_INTEGRITY, Some(hash)),
    );

    let err = module.activate().expect_err("integrity failure aborts activation");
    assert_eq!(
        err,
        ActivationError::Integrity(IntegrityError::InCoreHashMismatch {
            status: LibStatus::IN_CORE_INTEGRITY,
            computed_hash: Some(hash.to_string()),
        })
    );
    assert_eq!(err.host_code(), -125);

    assert_eq!(module.library().init_calls, 0);
    assert_eq!(module.library().self_test_calls, 0);

    assert!(CONSOLE.contains("FIPS error: In Core Integrity check failure (status -203)"));
    assert!(CONSOLE.contains("In-core integrity hash check failure."));
    assert!(CONSOLE.contains(&format!("\"{hash}\"")));
    assert!(CONSOLE.contains("In Core Integrity check failure"));
}

#[test]
fn in_core_mismatch_without_hash_reports_null() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut module = lifecycle(&table, MockLibrary::new(), profile())
        .with_fips(MockFips::failing(LibStatus::IN_CORE_INTEGRITY, None));

    assert!(matches!(
        module.activate(),
        Err(ActivationError::Integrity(IntegrityError::InCoreHashMismatch {
            computed_hash: None,
            ..
        }))
    ));
    assert!(CONSOLE.contains("\"<null>\""));
}

#[test]
fn integrity_failure_runs_neither_init_nor_self_test() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut module = lifecycle(&table, MockLibrary::new(), profile())
        .with_fips(MockFips::failing(LibStatus(-173), None));

    assert_eq!(
        module.activate(),
        Err(ActivationError::Integrity(IntegrityError::Validation(
            LibStatus(-173)
        )))
    );

    let lib = module.library();
    assert_eq!(lib.init_calls, 0);
    assert_eq!(lib.self_test_calls, 0);
    assert_eq!(lib.cleanup_calls, 0);
    assert!(CONSOLE.contains("FIPS status check failed: Bad function argument"));
}

#[test]
fn callback_registration_failure_skips_validation() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut fips = MockFips::new();
    fips.callback_status = LibStatus(-173);
    let mut module = lifecycle(&table, MockLibrary::new(), profile()).with_fips(fips);

    assert_eq!(
        module.activate(),
        Err(ActivationError::Integrity(
            IntegrityError::CallbackRegistration(LibStatus(-173))
        ))
    );
    assert_eq!(module.fips().map(|f| f.validation_runs), Some(0));
    assert_eq!(module.library().init_calls, 0);
}

#[test]
fn integrity_required_without_fips_module() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut module = lifecycle(&table, MockLibrary::new(), profile());
    assert_eq!(
        module.activate(),
        Err(ActivationError::Integrity(IntegrityError::Unavailable))
    );
    assert_eq!(module.library().init_calls, 0);
}

#[test]
fn library_init_failure_is_canceled_without_rollback() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut library = MockLibrary::new();
    library.init_status = LibStatus(-173);
    let mut module = lifecycle(&table, library, profile().with_integrity(false));

    let err = module.activate().expect_err("init failure aborts activation");
    assert_eq!(err, ActivationError::LibraryInit(LibStatus(-173)));
    assert_eq!(err.errno(), Errno::Canceled);

    let lib = module.library();
    assert_eq!(lib.self_test_calls, 0);
    assert_eq!(lib.cleanup_calls, 0);
    assert!(CONSOLE.contains("mockcrypt init failed: Bad function argument"));
}

#[test]
fn protocol_flavor_success_is_one() {
    let _log = capture_log();
    let protocol = profile()
        .with_integrity(false)
        .with_flavor(LibraryFlavor::Protocol);

    let table = TableCell::new();
    let mut module = lifecycle(&table, MockLibrary::protocol(), protocol);
    assert_eq!(module.activate(), Ok(()));

    // 0 is not success for the protocol library.
    let table = TableCell::new();
    let mut module = lifecycle(&table, MockLibrary::new(), protocol);
    assert_eq!(
        module.activate(),
        Err(ActivationError::LibraryInit(LibStatus::SUCCESS))
    );
}

#[test]
fn incomplete_table_is_a_fault_before_anything_runs() {
    let _log = capture_log();
    let table = TableCell::new();

    // FIPS boundary slots in scope, but the FIPS module exports no markers.
    let caps = Capabilities::ALL.with(Capability::CertLookup, false);
    let mut module = lifecycle(&table, MockLibrary::new(), profile().with_capabilities(caps))
        .with_fips(MockFips::new());

    let err = module.activate().expect_err("table build fails");
    assert_eq!(
        err,
        ActivationError::RedirectTable(BuildError::Incomplete {
            slot: Slot::FipsFirst
        })
    );
    assert_eq!(err.errno(), Errno::Fault);
    assert_eq!(err.host_code(), -14);

    assert_eq!(module.fips().map(|f| f.validation_runs), Some(0));
    assert_eq!(module.library().init_calls, 0);
    assert!(module.table().is_none());
    assert!(CONSOLE.contains("fips_first"));
}

#[test]
fn fips_markers_fill_the_boundary_slots() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut fips = MockFips::new();
    fips.markers = true;
    let caps = Capabilities::ALL.with(Capability::CertLookup, false);
    let mut module = lifecycle(&table, MockLibrary::new(), profile().with_capabilities(caps))
        .with_fips(fips);

    assert_eq!(module.activate(), Ok(()));
    let built = module.table().expect("table published");
    assert!(built.fips_first.is_some());
    assert!(built.fips_last.is_some());
}

#[test]
fn without_pie_redirect_no_table_is_built() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut module = lifecycle(
        &table,
        MockLibrary::new(),
        profile().with_pie_redirect(false).with_integrity(false),
    );
    assert_eq!(module.activate(), Ok(()));
    assert_eq!(module.library().saw_table, Some(false));
    assert!(!table.is_built());
}

#[test]
fn without_self_test_the_suite_never_runs() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut library = MockLibrary::new();
    library.self_test_result = SelfTestFailure::check(-1);
    let mut module = lifecycle(
        &table,
        library,
        profile().with_integrity(false).with_self_test(false),
    );

    assert_eq!(module.activate(), Ok(()));
    assert_eq!(module.library().self_test_calls, 0);
}

#[test]
fn second_activation_is_refused() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut module = lifecycle(&table, MockLibrary::new(), profile().with_integrity(false));
    assert_eq!(module.activate(), Ok(()));

    let err = module.activate().expect_err("already active");
    assert_eq!(err, ActivationError::NotUnloaded(ModuleState::Active));
    assert_eq!(err.errno(), Errno::Busy);
    assert_eq!(module.library().init_calls, 1);
}

#[test]
fn deactivate_cleans_up_once_after_success() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut module = lifecycle(&table, MockLibrary::new(), profile().with_integrity(false));
    assert_eq!(module.activate(), Ok(()));

    module.deactivate();
    assert_eq!(module.library().cleanup_calls, 1);
    assert_eq!(module.state(), ModuleState::Unloaded);
    assert!(CONSOLE.contains("mockcrypt 5.7.2 cleanup complete."));
}

#[test]
fn deactivate_cleans_up_once_after_failed_activation() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut module = lifecycle(&table, MockLibrary::new(), profile())
        .with_fips(MockFips::failing(LibStatus(-173), None));
    assert!(module.activate().is_err());

    module.deactivate();
    assert_eq!(module.library().cleanup_calls, 1);
    assert_eq!(module.state(), ModuleState::Unloaded);
}

#[test]
fn cleanup_failure_is_logged_not_escalated() {
    let _log = capture_log();
    let table = TableCell::new();

    let mut library = MockLibrary::new();
    library.cleanup_status = LibStatus(-173);
    let mut module = lifecycle(&table, library, profile().with_integrity(false));
    assert_eq!(module.activate(), Ok(()));

    module.deactivate();
    assert_eq!(module.library().cleanup_calls, 1);
    assert_eq!(module.state(), ModuleState::Unloaded);
    assert!(CONSOLE.contains("mockcrypt cleanup failed: Bad function argument"));
    assert!(!CONSOLE.contains("cleanup complete"));
}
