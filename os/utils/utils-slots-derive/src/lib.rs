//! # Redirect Slot Derive
//!
//! This crate provides a derive macro that turns a `#[repr(C)]` struct of
//! word-sized `Option<..>` slots into an enumerable, checkable table.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Path, parse_macro_input, spanned::Spanned};

/// Derive the slot bookkeeping for a redirect table.
///
/// For a struct `T` whose named fields are all `Option<F>` with `F` a
/// function pointer or a `&'static` reference, this generates:
///
/// - `enum Slot`: one variant per field (field name in `UpperCamelCase`),
///   with `Slot::COUNT`, `Slot::ALL`, `Slot::name()`, `Slot::index()` and
///   `Slot::capability()`.
/// - `T::EMPTY`: every slot `None`.
/// - `T::slot_word(&self, Slot) -> usize`: the slot read as a machine word,
///   `0` when empty.
/// - `T::clear_slot(&mut self, Slot)`.
/// - `T::LAYOUT_FINGERPRINT`: FNV-1a over the field names and types in
///   declaration order.
/// - Compile-time assertions that every slot is exactly one machine word and
///   that `T` has no padding.
///
/// Attributes:
/// - `#[slots(capability = Path)]` on the struct names the capability enum
///   (default `Capability`).
/// - `#[slot(capability = Variant)]` on a field ties the slot to
///   `Path::Variant`; fields without it are always in scope.
///
/// # Example
///
/// ```
/// use utils_slots_derive::RedirectSlots;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Feature { Fpu }
///
/// #[derive(RedirectSlots)]
/// #[slots(capability = Feature)]
/// #[repr(C)]
/// struct Table {
///     now: Option<extern "C" fn() -> i64>,
///     #[slot(capability = Fpu)]
///     fpu_begin: Option<extern "C" fn()>,
/// }
///
/// extern "C" fn now() -> i64 { 1 }
///
/// let mut t = Table::EMPTY;
/// t.now = Some(now);
/// assert_eq!(Slot::COUNT, 2);
/// assert_eq!(Slot::FpuBegin.capability(), Some(Feature::Fpu));
/// assert_ne!(t.slot_word(Slot::Now), 0);
/// assert_eq!(t.slot_word(Slot::FpuBegin), 0);
/// t.clear_slot(Slot::Now);
/// assert_eq!(t.slot_word(Slot::Now), 0);
/// ```
#[proc_macro_derive(RedirectSlots, attributes(slots, slot))]
pub fn derive_redirect_slots(input: TokenStream) -> TokenStream {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = parse_macro_input!(input as DeriveInput);

    if !generics.params.is_empty() {
        return syn::Error::new(generics.span(), "RedirectSlots tables cannot be generic")
            .to_compile_error()
            .into();
    }

    let fields = match data {
        Data::Struct(s) => match s.fields {
            Fields::Named(n) => n.named,
            Fields::Unnamed(u) => {
                return syn::Error::new(u.span(), "RedirectSlots only supports named fields")
                    .to_compile_error()
                    .into();
            }
            Fields::Unit => {
                return syn::Error::new(ident.span(), "RedirectSlots does not apply to unit structs")
                    .to_compile_error()
                    .into();
            }
        },
        _ => {
            return syn::Error::new(ident.span(), "RedirectSlots can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let capability_path = match capability_enum(&attrs) {
        Ok(path) => path,
        Err(e) => return e.to_compile_error().into(),
    };

    let mut variants = Vec::new();
    let mut names = Vec::new();
    let mut capabilities = Vec::new();
    let mut words = Vec::new();
    let mut clears = Vec::new();
    let mut empties = Vec::new();
    let mut size_checks = Vec::new();
    let mut fingerprint = Fnv1a::new();

    for field in &fields {
        let Some(fname) = &field.ident else { continue };
        let ty = &field.ty;
        let variant = Ident::new(&upper_camel(&fname.to_string()), fname.span());
        let name = LitStr::new(&fname.to_string(), fname.span());

        let capability = match slot_capability(&field.attrs) {
            Ok(Some(cap)) => quote! { ::core::option::Option::Some(#capability_path::#cap) },
            Ok(None) => quote! { ::core::option::Option::None },
            Err(e) => return e.to_compile_error().into(),
        };

        fingerprint.update(fname.to_string().as_bytes());
        fingerprint.update(b":");
        fingerprint.update(quote!(#ty).to_string().as_bytes());
        fingerprint.update(b";");

        words.push(quote! {
            // SAFETY: the slot is asserted below to be exactly one machine word,
            // and `None` is guaranteed to be represented as zero.
            Slot::#variant => unsafe { ::core::mem::transmute_copy::<#ty, usize>(&self.#fname) },
        });
        clears.push(quote! { Slot::#variant => self.#fname = ::core::option::Option::None, });
        empties.push(quote! { #fname: ::core::option::Option::None, });
        size_checks.push(quote! {
            assert!(
                ::core::mem::size_of::<#ty>() == ::core::mem::size_of::<usize>(),
                concat!("slot `", #name, "` is not one machine word"),
            );
        });
        capabilities.push(quote! { Self::#variant => #capability, });
        names.push(quote! { Self::#variant => #name, });
        variants.push(variant);
    }

    let count = variants.len();
    let fingerprint = fingerprint.finish();
    let doc = format!("Slots of [`{ident}`], in declaration order.");
    let assert_fn = format_ident!("__assert_{}_layout", ident.to_string().to_lowercase());

    let expanded = quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Slot {
            #(#variants,)*
        }

        impl Slot {
            /// Number of slots; the first index past the end of the table.
            pub const COUNT: usize = #count;

            /// Every slot, in table order.
            pub const ALL: [Self; #count] = [#(Self::#variants,)*];

            #[must_use]
            pub const fn index(self) -> usize {
                self as usize
            }

            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    #(#names)*
                }
            }

            /// The capability that puts this slot in scope, `None` if the slot
            /// is always required.
            #[must_use]
            pub const fn capability(self) -> ::core::option::Option<#capability_path> {
                match self {
                    #(#capabilities)*
                }
            }
        }

        impl ::core::fmt::Display for Slot {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl #ident {
            /// A table with every slot empty.
            pub const EMPTY: Self = Self {
                #(#empties)*
            };

            /// Hash of the slot names and types in declaration order.
            pub const LAYOUT_FINGERPRINT: u64 = #fingerprint;

            /// Read a slot as a machine word; `0` means empty.
            #[must_use]
            pub fn slot_word(&self, slot: Slot) -> usize {
                match slot {
                    #(#words)*
                }
            }

            /// Empty a slot.
            pub fn clear_slot(&mut self, slot: Slot) {
                match slot {
                    #(#clears)*
                }
            }
        }

        #[allow(non_snake_case, dead_code)]
        const fn #assert_fn() {
            #(#size_checks)*
            assert!(
                ::core::mem::size_of::<#ident>() == #count * ::core::mem::size_of::<usize>(),
                "redirect table has padding or non-slot fields",
            );
        }
        const _: () = #assert_fn();
    };

    TokenStream::from(expanded)
}

fn capability_enum(attrs: &[syn::Attribute]) -> syn::Result<Path> {
    let mut path: Path = syn::parse_quote!(Capability);
    for attr in attrs {
        if !attr.path().is_ident("slots") {
            continue;
        }

        // Accept #[slots(capability = Path)]
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("capability") {
                path = meta.value()?.parse()?;
                Ok(())
            } else {
                Err(meta.error("expected `capability = Path`"))
            }
        })?;
    }
    Ok(path)
}

fn slot_capability(attrs: &[syn::Attribute]) -> syn::Result<Option<Ident>> {
    let mut capability = None;
    for attr in attrs {
        if !attr.path().is_ident("slot") {
            continue;
        }

        // Accept #[slot(capability = Variant)]
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("capability") {
                capability = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `capability = Variant`"))
            }
        })?;
    }
    Ok(capability)
}

fn upper_camel(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

/// 64-bit FNV-1a, evaluated at expansion time.
struct Fnv1a(u64);

impl Fnv1a {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    const fn new() -> Self {
        Self(Self::OFFSET)
    }

    fn update(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= u64::from(*b);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    const fn finish(&self) -> u64 {
        self.0
    }
}
