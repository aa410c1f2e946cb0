//! Name-based dispatch of transaction functions.
//!
//! Hosts receive a function name and positional string arguments. This
//! module parses them into typed calls on [`LedgerContract<Asset>`] and
//! renders results as JSON, using the same field names as the stored
//! records.

use assetreg_store::TransactionContext;
use assetreg_types::Asset;
use serde::Serialize;
use serde_json::Value;

use crate::contract::LedgerContract;
use crate::error::{ContractError, ContractResult};
use crate::operation::Operation;

impl LedgerContract<Asset> {
    /// Invoke the transaction function `function` with `args`.
    ///
    /// Returns `None` for functions that only write, otherwise the JSON
    /// rendering of their result.
    pub fn invoke(
        &self,
        ctx: &dyn TransactionContext,
        function: &str,
        args: &[String],
    ) -> ContractResult<Option<Value>> {
        let op = Operation::from_name(function)
            .ok_or_else(|| ContractError::UnknownFunction(function.to_string()))?;
        check_arity(op, args)?;

        match op {
            Operation::InitLedger => {
                self.init_ledger(ctx)?;
                Ok(None)
            }
            Operation::CreateAsset => {
                let asset = parse_asset(op, &args[1..])?;
                self.create_asset(ctx, &args[0], asset)?;
                Ok(None)
            }
            Operation::ReadAsset => {
                let asset = self.read_asset(ctx, &args[0])?;
                render(op, Some(args[0].as_str()), &asset)
            }
            Operation::UpdateAsset => {
                let asset = parse_asset(op, &args[1..])?;
                self.update_asset(ctx, &args[0], asset)?;
                Ok(None)
            }
            Operation::DeleteAsset => {
                self.delete_asset(ctx, &args[0])?;
                Ok(None)
            }
            Operation::AssetExists => {
                let exists = self.asset_exists(ctx, &args[0])?;
                Ok(Some(Value::Bool(exists)))
            }
            Operation::TransferAsset => {
                self.transfer_asset(ctx, &args[0], &args[1])?;
                Ok(None)
            }
            Operation::GetAllAssets => {
                let assets = self.get_all_assets(ctx)?;
                render(op, None, &assets)
            }
            Operation::GetAssetHistory => {
                let history = self.get_asset_history(ctx, &args[0])?;
                render(op, Some(args[0].as_str()), &history)
            }
        }
    }
}

fn check_arity(op: Operation, args: &[String]) -> ContractResult<()> {
    let expected = op.parameters();
    if args.len() != expected.len() {
        return Err(ContractError::InvalidArgument {
            op,
            reason: format!(
                "expected {} argument(s) ({}), got {}",
                expected.len(),
                expected.join(", "),
                args.len()
            ),
        });
    }
    Ok(())
}

/// Build an asset from `name, isDefect, serialNumber, owner`.
fn parse_asset(op: Operation, fields: &[String]) -> ContractResult<Asset> {
    Ok(Asset {
        name: fields[0].clone(),
        is_defect: parse_bool(op, "isDefect", &fields[1])?,
        serial_number: fields[2].clone(),
        owner: fields[3].clone(),
    })
}

fn parse_bool(op: Operation, param: &str, raw: &str) -> ContractResult<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ContractError::InvalidArgument {
            op,
            reason: format!("{param} must be a boolean, got {raw:?}"),
        }),
    }
}

/// Render a result as JSON. `id` names the asset the result is about, if any.
fn render<T: Serialize>(
    op: Operation,
    id: Option<&str>,
    value: &T,
) -> ContractResult<Option<Value>> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(|e| ContractError::Encode {
            op,
            id: id.map(str::to_string),
            reason: e.to_string(),
        })
}
