use crate::{BuildError, Capabilities, Capability};
use core::ffi::{c_char, c_int, c_void};
use kernel_host::KernelSymbols;
use kernel_host::abi::{
    CtypeTable, GetRandomBytesFn, IsVmallocAddrFn, KernelFpuBeginFn, KernelFpuEndFn, KfreeFn,
    KmallocFn, KreallocFn, KsizeFn, KstrtollFn, KtimeGetRealSecondsFn, KtimeGetWithOffsetFn,
    KmallocOrderTraceFn, KmemCacheAllocTraceFn, KvfreeFn, KvmallocNodeFn, MemcmpFn, MemcpyFn,
    MemmoveFn, MemsetFn, MutexInitFn, MutexLockFn, MutexUnlockFn, PrintkFn, SnprintfFn, StrlenFn,
    StrncasecmpFn, StrncatFn, StrncmpFn, StrncpyFn, StrstrFn,
};
use kernel_sync::{WriteOnce, WriteOnceError};
use utils_slots_derive::RedirectSlots;

/// Start/end markers of the FIPS cryptographic boundary.
pub type FipsMarkerFn = unsafe extern "C" fn() -> c_int;
/// Look up a CA by subject key id.
pub type GetCaFn = unsafe extern "C" fn(*mut c_void, *const u8) -> *mut c_void;
/// Look up a CA by subject name.
pub type GetCaByNameFn = unsafe extern "C" fn(*mut c_void, *const c_char) -> *mut c_void;

/// The host primitives PIE-compiled library code calls through.
///
/// The field order is the ABI. Reordering, adding or retyping a slot changes
/// [`RedirectTable::LAYOUT_FINGERPRINT`] and breaks every library image
/// compiled against the old layout.
#[derive(RedirectSlots, Clone, Copy)]
#[slots(capability = Capability)]
#[repr(C)]
pub struct RedirectTable {
    #[slot(capability = MemRedirect)]
    pub memcmp: Option<MemcmpFn>,
    #[slot(capability = MemRedirect)]
    pub memcpy: Option<MemcpyFn>,
    #[slot(capability = MemRedirect)]
    pub memset: Option<MemsetFn>,
    #[slot(capability = MemRedirect)]
    pub memmove: Option<MemmoveFn>,

    #[slot(capability = StrRedirect)]
    pub strncmp: Option<StrncmpFn>,
    #[slot(capability = StrRedirect)]
    pub strlen: Option<StrlenFn>,
    #[slot(capability = StrRedirect)]
    pub strstr: Option<StrstrFn>,
    #[slot(capability = StrRedirect)]
    pub strncpy: Option<StrncpyFn>,
    #[slot(capability = StrRedirect)]
    pub strncat: Option<StrncatFn>,
    #[slot(capability = StrRedirect)]
    pub strncasecmp: Option<StrncasecmpFn>,

    pub kstrtoll: Option<KstrtollFn>,
    pub printk: Option<PrintkFn>,
    pub snprintf: Option<SnprintfFn>,
    pub ctype: Option<&'static CtypeTable>,

    pub kmalloc: Option<KmallocFn>,
    pub kfree: Option<KfreeFn>,
    pub ksize: Option<KsizeFn>,
    pub krealloc: Option<KreallocFn>,
    #[slot(capability = Kvmalloc)]
    pub kvmalloc_node: Option<KvmallocNodeFn>,
    #[slot(capability = Kvmalloc)]
    pub kvfree: Option<KvfreeFn>,
    pub is_vmalloc_addr: Option<IsVmallocAddrFn>,
    #[slot(capability = SlabTrace)]
    pub kmem_cache_alloc_trace: Option<KmemCacheAllocTraceFn>,
    #[slot(capability = SlabTrace)]
    pub kmalloc_order_trace: Option<KmallocOrderTraceFn>,

    pub get_random_bytes: Option<GetRandomBytesFn>,
    pub ktime_get_real_seconds: Option<KtimeGetRealSecondsFn>,
    pub ktime_get_with_offset: Option<KtimeGetWithOffsetFn>,

    #[slot(capability = FpuState)]
    pub kernel_fpu_begin: Option<KernelFpuBeginFn>,
    #[slot(capability = FpuState)]
    pub kernel_fpu_end: Option<KernelFpuEndFn>,

    pub mutex_init: Option<MutexInitFn>,
    pub mutex_lock: Option<MutexLockFn>,
    pub mutex_unlock: Option<MutexUnlockFn>,

    #[slot(capability = FipsBoundary)]
    pub fips_first: Option<FipsMarkerFn>,
    #[slot(capability = FipsBoundary)]
    pub fips_last: Option<FipsMarkerFn>,

    #[slot(capability = CertLookup)]
    pub get_ca: Option<GetCaFn>,
    #[slot(capability = CertLookup)]
    pub get_ca_by_name: Option<GetCaByNameFn>,
}

/// Boundary markers exported by a FIPS-validated library image.
#[derive(Clone, Copy)]
pub struct FipsMarkers {
    pub first: FipsMarkerFn,
    pub last: FipsMarkerFn,
}

/// Certificate-store lookups exported by the protocol library.
#[derive(Clone, Copy)]
pub struct CertLookup {
    pub get_ca: GetCaFn,
    pub get_ca_by_name: GetCaByNameFn,
}

/// Where slot values come from.
#[derive(Clone, Copy)]
pub struct SymbolSources {
    pub kernel: KernelSymbols,
    pub fips: Option<FipsMarkers>,
    pub certs: Option<CertLookup>,
}

impl SymbolSources {
    #[must_use]
    pub const fn new(kernel: KernelSymbols) -> Self {
        Self {
            kernel,
            fips: None,
            certs: None,
        }
    }

    #[must_use]
    pub const fn with_fips(mut self, markers: FipsMarkers) -> Self {
        self.fips = Some(markers);
        self
    }

    #[must_use]
    pub const fn with_certs(mut self, lookup: CertLookup) -> Self {
        self.certs = Some(lookup);
        self
    }
}

impl RedirectTable {
    /// Assign every slot in scope for `caps`; out-of-scope slots stay empty.
    ///
    /// Optional host symbols that are absent leave their slot empty as well,
    /// which [`verify`](Self::verify) reports if the slot is in scope.
    #[must_use]
    pub fn populate(caps: Capabilities, sources: &SymbolSources) -> Self {
        let k = &sources.kernel;
        let mut t = Self::EMPTY;

        if caps.mem_redirect() {
            t.memcmp = Some(k.memcmp);
            t.memcpy = Some(k.memcpy);
            t.memset = Some(k.memset);
            t.memmove = Some(k.memmove);
        }

        if caps.str_redirect() {
            t.strncmp = Some(k.strncmp);
            t.strlen = Some(k.strlen);
            t.strstr = Some(k.strstr);
            t.strncpy = Some(k.strncpy);
            t.strncat = Some(k.strncat);
            t.strncasecmp = Some(k.strncasecmp);
        }

        t.kstrtoll = Some(k.kstrtoll);
        t.printk = Some(k.printk);
        t.snprintf = Some(k.snprintf);
        t.ctype = Some(k.ctype);

        t.kmalloc = Some(k.kmalloc);
        t.kfree = Some(k.kfree);
        t.ksize = Some(k.ksize);
        t.krealloc = Some(k.krealloc);
        if caps.kvmalloc() {
            t.kvmalloc_node = k.kvmalloc_node;
            t.kvfree = k.kvfree;
        }
        t.is_vmalloc_addr = Some(k.is_vmalloc_addr);
        if caps.slab_trace() {
            t.kmem_cache_alloc_trace = k.kmem_cache_alloc_trace;
            t.kmalloc_order_trace = k.kmalloc_order_trace;
        }

        t.get_random_bytes = Some(k.get_random_bytes);
        t.ktime_get_real_seconds = Some(k.ktime_get_real_seconds);
        t.ktime_get_with_offset = Some(k.ktime_get_with_offset);

        if caps.fpu_state() {
            t.kernel_fpu_begin = k.kernel_fpu_begin;
            t.kernel_fpu_end = k.kernel_fpu_end;
        }

        t.mutex_init = Some(k.mutex_init);
        t.mutex_lock = Some(k.mutex_lock);
        t.mutex_unlock = Some(k.mutex_unlock);

        if caps.fips_boundary()
            && let Some(markers) = sources.fips
        {
            t.fips_first = Some(markers.first);
            t.fips_last = Some(markers.last);
        }

        if caps.cert_lookup()
            && let Some(lookup) = sources.certs
        {
            t.get_ca = Some(lookup.get_ca);
            t.get_ca_by_name = Some(lookup.get_ca_by_name);
        }

        t
    }

    /// The first slot that is in scope for `caps` but empty.
    #[must_use]
    pub fn first_missing(&self, caps: Capabilities) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|&slot| caps.in_scope(slot) && self.slot_word(slot) == 0)
    }

    /// Slots that currently hold a value, in table order.
    pub fn populated(&self) -> impl Iterator<Item = Slot> + '_ {
        Slot::ALL
            .into_iter()
            .filter(|&slot| self.slot_word(slot) != 0)
    }

    /// Check that every in-scope slot is populated.
    ///
    /// # Errors
    /// [`BuildError::Incomplete`] naming the first empty in-scope slot.
    pub fn verify(&self, caps: Capabilities) -> Result<(), BuildError> {
        self.first_missing(caps)
            .map_or(Ok(()), |slot| Err(BuildError::Incomplete { slot }))
    }

    /// Reject a consumer compiled against a different slot layout.
    ///
    /// # Errors
    /// [`BuildError::LayoutMismatch`] if `expected` differs from this build's
    /// fingerprint.
    pub const fn check_layout(expected: u64) -> Result<(), BuildError> {
        if expected == Self::LAYOUT_FINGERPRINT {
            Ok(())
        } else {
            Err(BuildError::LayoutMismatch {
                expected,
                actual: Self::LAYOUT_FINGERPRINT,
            })
        }
    }
}

/// Storage for a built [`RedirectTable`].
///
/// The only way to write the cell is [`build_into`], so a table read from it
/// has always passed [`RedirectTable::verify`].
pub struct TableCell(WriteOnce<RedirectTable>);

impl TableCell {
    #[must_use]
    pub const fn new() -> Self {
        Self(WriteOnce::new())
    }

    /// The built table, `None` before a successful build.
    #[must_use]
    pub fn get(&self) -> Option<&RedirectTable> {
        self.0.get()
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.0.is_sealed()
    }
}

impl Default for TableCell {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide table consumed by the PIE library image.
pub static REDIRECT_TABLE: TableCell = TableCell::new();

/// Populate, verify and publish a table in `cell`.
///
/// Only one build per cell is ever attempted; a failed build poisons the
/// cell.
///
/// # Errors
/// [`BuildError::Incomplete`] if an in-scope slot stayed empty,
/// [`BuildError::AlreadyBuilt`] or [`BuildError::Poisoned`] if the cell was
/// written before.
pub fn build_into<'c>(
    cell: &'c TableCell,
    caps: Capabilities,
    sources: &SymbolSources,
) -> Result<&'c RedirectTable, BuildError> {
    let table = cell
        .0
        .try_write_with(|| {
            let table = RedirectTable::populate(caps, sources);
            table.verify(caps)?;
            Ok(table)
        })
        .map_err(|e| match e {
            WriteOnceError::AlreadyWritten => BuildError::AlreadyBuilt,
            WriteOnceError::Poisoned => BuildError::Poisoned,
            WriteOnceError::Init(e) => e,
        })
        .inspect_err(|e| log::error!("redirect table setup failed: {e}"))?;

    log::debug!(
        "redirect table built: {} of {} slots populated",
        table.populated().count(),
        Slot::COUNT
    );
    Ok(table)
}

/// Build the process-wide table for this build's capability set.
///
/// # Errors
/// See [`build_into`].
pub fn build_with(sources: &SymbolSources) -> Result<&'static RedirectTable, BuildError> {
    build_into(&REDIRECT_TABLE, Capabilities::BUILD, sources)
}

/// Build the process-wide table from the host backend's own symbols.
///
/// # Errors
/// See [`build_into`].
#[cfg(any(feature = "hosted", feature = "linux"))]
pub fn build() -> Result<&'static RedirectTable, BuildError> {
    build_with(&SymbolSources::new(kernel_host::kernel_symbols()))
}

/// The process-wide table, once built.
#[must_use]
pub fn redirect_table() -> Option<&'static RedirectTable> {
    REDIRECT_TABLE.get()
}
