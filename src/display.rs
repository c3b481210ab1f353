use crate::contracts::ContractHandle;
use crate::legacy::VersionManager;
use alloy::primitives::Address;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::markdown())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()));
    table.to_string()
}

/// Display resolved contract addresses in a markdown table
///
/// Each entry is a name and either its resolved address or the error that
/// prevented resolution.
pub fn display_addresses(results: &[(String, Result<Address, String>)]) {
    if results.is_empty() {
        println!("\nNo contracts requested.\n");
        return;
    }

    #[derive(Tabled)]
    struct AddressRow {
        #[tabled(rename = "Contract")]
        name: String,
        #[tabled(rename = "Address")]
        address: String,
        #[tabled(rename = "Status")]
        status: String,
    }

    let rows: Vec<AddressRow> = results
        .iter()
        .map(|(name, result)| match result {
            Ok(address) if address.is_zero() => AddressRow {
                name: name.clone(),
                address: "-".to_string(),
                status: "not deployed".to_string(),
            },
            Ok(address) => AddressRow {
                name: name.clone(),
                address: address.to_checksum(None),
                status: "deployed".to_string(),
            },
            Err(e) => AddressRow {
                name: name.clone(),
                address: "-".to_string(),
                status: format!("error: {e}"),
            },
        })
        .collect();

    println!("\n## Contract Addresses\n");
    println!("{}\n", render(rows));
}

/// Display a contract handle and the functions its ABI exposes
pub fn display_contract(name: &str, contract: &ContractHandle) {
    println!("\n## {name}\n");
    if !contract.is_deployed() {
        println!("Not deployed on this network.\n");
        return;
    }

    println!("**Address:** {}\n", contract.address().to_checksum(None));

    #[derive(Tabled)]
    struct FunctionRow {
        #[tabled(rename = "Function")]
        signature: String,
        #[tabled(rename = "Mutability")]
        mutability: String,
    }

    let rows: Vec<FunctionRow> = contract
        .abi()
        .functions()
        .map(|function| FunctionRow {
            signature: function.signature(),
            mutability: format!("{:?}", function.state_mutability).to_lowercase(),
        })
        .collect();

    println!("{}\n", render(rows));
}

/// Display every legacy release and the contracts it replaced
pub fn display_legacy_tables(manager: &VersionManager) {
    #[derive(Tabled)]
    struct LegacyRow {
        #[tabled(rename = "Version")]
        version: String,
        #[tabled(rename = "Contract")]
        name: String,
        #[tabled(rename = "Legacy Name")]
        legacy_name: String,
    }

    let mut rows = Vec::new();
    for version in manager.versions() {
        let Ok(wrapper) = manager.wrapper(version) else {
            continue;
        };
        for name in wrapper.contract_names() {
            rows.push(LegacyRow {
                version: version.to_string(),
                name: name.to_string(),
                legacy_name: wrapper.legacy_name(name).unwrap_or_default().to_string(),
            });
        }
    }

    println!("\n## Legacy Contract Versions\n");
    println!("{}\n", render(rows));
}
