mod common;

use common::{CONSOLE, MockLibrary, capture_log};
use module_redirect::redirect_table;

module_lifecycle::module_entry! {
    init = mock_module_init,
    exit = mock_module_exit,
    library: MockLibrary = MockLibrary::new(),
    symbols = kernel_host::kernel_symbols(),
}

#[test]
fn entry_points_drive_the_process_wide_lifecycle() {
    let _log = capture_log();

    assert_eq!(mock_module_init(), 0);
    assert!(redirect_table().is_some());
    assert!(CONSOLE.contains("mockcrypt 5.7.2 loaded."));
    assert!(!CONSOLE.contains("for information"));

    // The module is active; a second load is refused with -EBUSY.
    assert_eq!(mock_module_init(), -16);

    mock_module_exit();
    assert!(CONSOLE.contains("mockcrypt 5.7.2 cleanup complete."));
}
