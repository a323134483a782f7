use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, LitStr, PatType, Type};

/// Turns a fixed-arity function over `Value` parameters into a builtin with
/// the `fn(&[Value]) -> Result<Value, EvalError>` calling convention.
///
/// The generated function checks the argument count before binding each
/// parameter by position. An optional string literal overrides the name used
/// in arity errors, e.g. `#[builtin("if")]` on `fn if_(..)`.
#[proc_macro_attribute]
pub fn builtin(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let fn_name = &input.sig.ident;
    let fn_args = &input.sig.inputs;
    let fn_body = &input.block;
    let fn_output = &input.sig.output;

    let display_name = if attr.is_empty() {
        fn_name.to_string()
    } else {
        parse_macro_input!(attr as LitStr).value()
    };

    let mut arg_bindings = Vec::new();

    for (i, arg) in fn_args.iter().enumerate() {
        let FnArg::Typed(PatType { pat, ty, .. }) = arg else {
            return syn::Error::new_spanned(arg, "builtins cannot take a receiver")
                .to_compile_error()
                .into();
        };

        let arg_name = match **pat {
            syn::Pat::Ident(ref ident) => &ident.ident,
            _ => {
                return syn::Error::new_spanned(pat, "unsupported argument pattern")
                    .to_compile_error()
                    .into()
            }
        };

        let is_value = match **ty {
            Type::Path(ref type_path) => type_path
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "Value"),
            _ => false,
        };
        if !is_value {
            return syn::Error::new_spanned(ty, "builtin parameters must be `Value`")
                .to_compile_error()
                .into();
        }

        arg_bindings.push(quote! {
            let #arg_name = args[#i].clone();
        });
    }

    let args_len = arg_bindings.len();
    let expanded = quote! {
        pub fn #fn_name(args: &[Value]) #fn_output {
            if args.len() != #args_len {
                return Err(EvalError::Arity {
                    function: #display_name.to_string(),
                    expected: #args_len,
                    supplied: args.len(),
                });
            }

            #(#arg_bindings)*

            #fn_body
        }
    };

    TokenStream::from(expanded)
}
