// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod columns;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `tuplevec::Columns` for a struct, splitting its fields into
/// the columns of a `TupleVec` and generating named `Ref`/`Mut`/`Slice`/
/// `SliceMut` wrapper structs so columns are addressed by field name.
#[proc_macro_derive(Columns)]
pub fn derive_columns(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    columns::expand_derive_columns(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
