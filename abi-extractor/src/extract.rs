// Static ABI derivation for runelet contracts.
//
// A contract exposes its entry points as literal arms of the opcode
// `match` inside `RuneletContract::dispatch`. The source is parsed, never
// executed; anything that is not such an arm is ignored.

use serde::Serialize;
use syn::{Expr, ExprMatch, ImplItem, Item, Lit, Pat, PatLit, Stmt, Type};

/// Trait a contract struct implements to receive dispatch calls.
pub const CONTRACT_TRAIT: &str = "RuneletContract";

/// Method holding the opcode match.
const DISPATCH_METHOD: &str = "dispatch";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AbiMethod {
    pub name: String,
    pub opcode: u64,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ContractAbi {
    pub contract: String,
    pub methods: Vec<AbiMethod>,
}

pub fn extract_abi(source: &str) -> Result<ContractAbi, String> {
    let syntax = syn::parse_file(source).map_err(|e| format!("parse error: {}", e))?;
    let mut contract = "UnknownContract".to_string();
    let mut methods = Vec::new();

    for item in syntax.items {
        let Item::Impl(item_impl) = item else { continue };
        let Some((_, trait_path, _)) = &item_impl.trait_ else {
            continue;
        };
        let is_contract = trait_path
            .segments
            .last()
            .map(|seg| seg.ident == CONTRACT_TRAIT)
            .unwrap_or(false);
        if !is_contract {
            continue;
        }

        if let Type::Path(struct_path) = &*item_impl.self_ty {
            if let Some(seg) = struct_path.path.segments.last() {
                contract = seg.ident.to_string();
            }
        }
        for impl_item in item_impl.items {
            let ImplItem::Fn(method) = impl_item else { continue };
            if method.sig.ident != DISPATCH_METHOD {
                continue;
            }
            collect_opcode_arms(&method.block.stmts, &mut methods);
        }
    }

    methods.sort_by_key(|m| m.opcode);
    Ok(ContractAbi { contract, methods })
}

fn collect_opcode_arms(stmts: &[Stmt], methods: &mut Vec<AbiMethod>) {
    for stmt in stmts {
        let Stmt::Expr(Expr::Match(ExprMatch { arms, .. }), _) = stmt else {
            continue;
        };
        for arm in arms {
            let Pat::Lit(PatLit { lit, .. }) = &arm.pat else {
                continue;
            };
            let Lit::Int(lit_int) = lit else { continue };
            let Ok(opcode) = lit_int.base10_parse::<u64>() else {
                continue;
            };
            let name =
                arm_method_name(&arm.body).unwrap_or_else(|| format!("method_{}", opcode));
            methods.push(AbiMethod {
                name,
                opcode,
                inputs: Vec::new(),
                outputs: Vec::new(),
            });
        }
    }
}

// When the arm body is a plain call, the callee name doubles as the ABI
// method name; otherwise the opcode names the method.
fn arm_method_name(body: &Expr) -> Option<String> {
    match body {
        Expr::MethodCall(call) => Some(call.method.to_string()),
        Expr::Call(call) => match &*call.func {
            Expr::Path(path) => path.path.segments.last().map(|seg| seg.ident.to_string()),
            _ => None,
        },
        Expr::Try(inner) => arm_method_name(&inner.expr),
        _ => None,
    }
}
