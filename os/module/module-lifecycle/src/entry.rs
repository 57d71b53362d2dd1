/// Define the loader-facing init and exit functions of the module.
///
/// The controller lives in a process-wide slot and publishes into the
/// process-wide redirect table with this build's [`BuildProfile::BUILD`].
/// `symbols` names the host backend the table is filled from; it is
/// evaluated on the first `init` call.
/// `init` returns `0` or a negative host status code; `exit` always
/// succeeds.
///
/// ```ignore
/// module_lifecycle::module_entry! {
///     init = crypto_module_init,
///     exit = crypto_module_exit,
///     library: MyLibrary = MyLibrary::new(),
///     symbols = kernel_host::kernel_symbols(),
/// }
/// ```
///
/// A FIPS build attaches its FIPS module as well:
///
/// ```ignore
/// module_lifecycle::module_entry! {
///     init = crypto_module_init,
///     exit = crypto_module_exit,
///     library: MyLibrary = MyLibrary::new(),
///     fips: MyFips = MyFips::new(),
///     symbols = kernel_host::kernel_symbols(),
/// }
/// ```
///
/// [`BuildProfile::BUILD`]: crate::BuildProfile::BUILD
#[macro_export]
macro_rules! module_entry {
    (
        init = $init:ident,
        exit = $exit:ident,
        library: $lib:ty = $make:expr,
        symbols = $symbols:expr $(,)?
    ) => {
        $crate::module_entry!(
            @emit $init, $exit,
            $crate::ModuleLifecycle<'static, $lib>,
            $crate::__private::lifecycle::<$lib>($make, $symbols)
        );
    };
    (
        init = $init:ident,
        exit = $exit:ident,
        library: $lib:ty = $make:expr,
        fips: $fips:ty = $fips_make:expr,
        symbols = $symbols:expr $(,)?
    ) => {
        $crate::module_entry!(
            @emit $init, $exit,
            $crate::ModuleLifecycle<'static, $lib, $fips>,
            $crate::__private::lifecycle::<$lib>($make, $symbols).with_fips::<$fips>($fips_make)
        );
    };
    (@emit $init:ident, $exit:ident, $lifecycle:ty, $make:expr) => {
        static __MODULE_LIFECYCLE: $crate::__private::SpinMutex<::core::option::Option<$lifecycle>> =
            $crate::__private::SpinMutex::new(::core::option::Option::None);

        #[cfg_attr(not(test), unsafe(no_mangle))]
        pub extern "C" fn $init() -> ::core::ffi::c_int {
            let mut module = __MODULE_LIFECYCLE.lock();
            let lifecycle = module.get_or_insert_with(|| $make);
            match lifecycle.activate() {
                ::core::result::Result::Ok(()) => 0,
                ::core::result::Result::Err(e) => e.host_code(),
            }
        }

        #[cfg_attr(not(test), unsafe(no_mangle))]
        pub extern "C" fn $exit() {
            if let ::core::option::Option::Some(lifecycle) = __MODULE_LIFECYCLE.lock().as_mut() {
                lifecycle.deactivate();
            }
        }
    };
}
