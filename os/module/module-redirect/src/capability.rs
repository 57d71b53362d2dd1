use crate::Slot;
use bitfield_struct::bitfield;

/// An optional group of redirect slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    MemRedirect,
    StrRedirect,
    Kvmalloc,
    FpuState,
    FipsBoundary,
    CertLookup,
    SlabTrace,
}

impl Capability {
    pub const ALL: [Self; 7] = [
        Self::MemRedirect,
        Self::StrRedirect,
        Self::Kvmalloc,
        Self::FpuState,
        Self::FipsBoundary,
        Self::CertLookup,
        Self::SlabTrace,
    ];
}

/// The set of enabled [`Capability`] groups.
///
/// Layout (LSB→MSB):
/// - bit 0: memory primitives redirected
/// - bit 1: string primitives redirected
/// - bit 2: `kvmalloc` family
/// - bit 3: kernel FPU sections
/// - bit 4: FIPS boundary markers
/// - bit 5: certificate-store lookups
/// - bit 6: out-of-line slab allocation entry points
/// - bits 7..31: reserved
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct Capabilities {
    pub mem_redirect: bool,
    pub str_redirect: bool,
    pub kvmalloc: bool,
    pub fpu_state: bool,
    pub fips_boundary: bool,
    pub cert_lookup: bool,
    pub slab_trace: bool,
    #[bits(25)]
    __: u32,
}

impl Capabilities {
    /// Only the unconditional slots.
    pub const NONE: Self = Self::new();

    pub const ALL: Self = Self::new()
        .with_mem_redirect(true)
        .with_str_redirect(true)
        .with_kvmalloc(true)
        .with_fpu_state(true)
        .with_fips_boundary(true)
        .with_cert_lookup(true)
        .with_slab_trace(true);

    /// The capability set selected by this build's cargo features.
    pub const BUILD: Self = Self::new()
        .with_mem_redirect(cfg!(feature = "mem-redirect"))
        .with_str_redirect(cfg!(feature = "str-redirect"))
        .with_kvmalloc(cfg!(feature = "kvmalloc"))
        .with_fpu_state(cfg!(feature = "fpu"))
        .with_fips_boundary(cfg!(feature = "fips"))
        .with_cert_lookup(cfg!(feature = "certs"))
        .with_slab_trace(cfg!(feature = "slab-trace"));

    /// Number of distinct capability sets.
    pub const COMBINATIONS: u32 = 1 << Capability::ALL.len();

    #[must_use]
    pub const fn covers(self, capability: Capability) -> bool {
        match capability {
            Capability::MemRedirect => self.mem_redirect(),
            Capability::StrRedirect => self.str_redirect(),
            Capability::Kvmalloc => self.kvmalloc(),
            Capability::FpuState => self.fpu_state(),
            Capability::FipsBoundary => self.fips_boundary(),
            Capability::CertLookup => self.cert_lookup(),
            Capability::SlabTrace => self.slab_trace(),
        }
    }

    #[must_use]
    pub const fn with(self, capability: Capability, enabled: bool) -> Self {
        match capability {
            Capability::MemRedirect => self.with_mem_redirect(enabled),
            Capability::StrRedirect => self.with_str_redirect(enabled),
            Capability::Kvmalloc => self.with_kvmalloc(enabled),
            Capability::FpuState => self.with_fpu_state(enabled),
            Capability::FipsBoundary => self.with_fips_boundary(enabled),
            Capability::CertLookup => self.with_cert_lookup(enabled),
            Capability::SlabTrace => self.with_slab_trace(enabled),
        }
    }

    /// Whether `slot` must be populated under this capability set.
    #[must_use]
    pub const fn in_scope(self, slot: Slot) -> bool {
        match slot.capability() {
            Some(capability) => self.covers(capability),
            None => true,
        }
    }

    /// Every capability set, from [`Self::NONE`] to [`Self::ALL`].
    pub fn combinations() -> impl Iterator<Item = Self> {
        (0..Self::COMBINATIONS).map(Self::from_bits)
    }
}
