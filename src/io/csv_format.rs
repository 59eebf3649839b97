//! CSV format handling for ledger requests and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Validation and conversion from CSV records to [`LedgerRequest`]s
//! - Account output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{Account, AccountId, LedgerError, LedgerRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns:
/// `op, account_id, name, national_id, phone, amount`.
/// Every column but `op` is optional; which ones are required depends on the
/// operation.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CsvRecord {
    pub op: String,
    pub account_id: Option<String>,
    pub name: Option<String>,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to a LedgerRequest
///
/// This function:
/// - Parses the operation name (case-insensitive)
/// - Checks that every field the operation requires is present and not blank
/// - Parses the amount into a Decimal for deposits and withdrawals
///
/// Amount positivity is left to the ledger, which rejects zero and negative
/// amounts itself.
///
/// # Returns
///
/// * `Ok(LedgerRequest)` - Successfully converted request
/// * `Err(LedgerError::InvalidInput)` - Unknown operation, missing field or
///   malformed amount
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<LedgerRequest, LedgerError> {
    match csv_record.op.trim().to_lowercase().as_str() {
        "register" => Ok(LedgerRequest::Register {
            name: required("name", csv_record.name)?,
            national_id: required("national_id", csv_record.national_id)?,
            phone: required("phone", csv_record.phone)?,
        }),
        "deposit" => Ok(LedgerRequest::Deposit {
            account_id: account_id(csv_record.account_id)?,
            amount: amount(csv_record.amount)?,
        }),
        "withdraw" => Ok(LedgerRequest::Withdraw {
            account_id: account_id(csv_record.account_id)?,
            amount: amount(csv_record.amount)?,
        }),
        "balance" => Ok(LedgerRequest::Balance {
            account_id: account_id(csv_record.account_id)?,
        }),
        _ => Err(LedgerError::invalid_input(
            "op",
            format!("unknown operation '{}'", csv_record.op),
        )),
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, LedgerError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(LedgerError::invalid_input(field, "is required")),
    }
}

fn account_id(value: Option<String>) -> Result<AccountId, LedgerError> {
    required("account_id", value).map(AccountId::from)
}

fn amount(value: Option<String>) -> Result<Decimal, LedgerError> {
    let raw = required("amount", value)?;
    Decimal::from_str(&raw).map_err(|_| {
        LedgerError::invalid_input("amount", format!("'{raw}' is not a decimal number"))
    })
}

/// Write account states to CSV format
///
/// Writes accounts with columns `account_id, name, national_id, phone, balance`,
/// sorted by account identifier for deterministic output.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account_id", "name", "national_id", "phone", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by(|a, b| a.account_id.cmp(&b.account_id));

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.account_id.to_string(),
                account.name,
                account.national_id,
                account.phone,
                format!("{:.4}", account.balance),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(op: &str, account_id: Option<&str>, amount: Option<&str>) -> CsvRecord {
        CsvRecord {
            op: op.to_string(),
            account_id: account_id.map(str::to_string),
            amount: amount.map(str::to_string),
            ..CsvRecord::default()
        }
    }

    fn registration(
        name: Option<&str>,
        national_id: Option<&str>,
        phone: Option<&str>,
    ) -> CsvRecord {
        CsvRecord {
            op: "register".to_string(),
            name: name.map(str::to_string),
            national_id: national_id.map(str::to_string),
            phone: phone.map(str::to_string),
            ..CsvRecord::default()
        }
    }

    #[test]
    fn test_convert_register() {
        let result = convert_csv_record(registration(Some("Alice"), Some("N1"), Some("P1")));

        assert_eq!(
            result,
            Ok(LedgerRequest::Register {
                name: "Alice".to_string(),
                national_id: "N1".to_string(),
                phone: "P1".to_string(),
            })
        );
    }

    #[rstest]
    #[case("deposit")]
    #[case("DEPOSIT")] // case insensitive
    #[case(" Deposit ")]
    fn test_convert_deposit(#[case] op: &str) {
        let result = convert_csv_record(record(op, Some("0000000001"), Some("100.50")));

        assert_eq!(
            result,
            Ok(LedgerRequest::Deposit {
                account_id: AccountId::from("0000000001"),
                amount: Decimal::new(10050, 2),
            })
        );
    }

    #[test]
    fn test_convert_withdraw_and_balance() {
        assert_eq!(
            convert_csv_record(record("withdraw", Some("0000000002"), Some("7"))),
            Ok(LedgerRequest::Withdraw {
                account_id: AccountId::from("0000000002"),
                amount: Decimal::new(7, 0),
            })
        );
        assert_eq!(
            convert_csv_record(record("balance", Some("0000000002"), None)),
            Ok(LedgerRequest::Balance {
                account_id: AccountId::from("0000000002"),
            })
        );
    }

    #[test]
    fn test_non_positive_amount_is_left_to_the_ledger() {
        let result = convert_csv_record(record("deposit", Some("0000000001"), Some("-5")));

        assert!(matches!(
            result,
            Ok(LedgerRequest::Deposit { amount, .. }) if amount == Decimal::new(-5, 0)
        ));
    }

    #[rstest]
    #[case::missing_name(registration(None, Some("N1"), Some("P1")), "name")]
    #[case::blank_national_id(registration(Some("Alice"), Some("  "), Some("P1")), "national_id")]
    #[case::missing_phone(registration(Some("Alice"), Some("N1"), None), "phone")]
    #[case::deposit_without_account(record("deposit", None, Some("1")), "account_id")]
    #[case::deposit_without_amount(record("deposit", Some("0000000001"), None), "amount")]
    #[case::withdraw_with_blank_amount(record("withdraw", Some("0000000001"), Some("")), "amount")]
    #[case::malformed_amount(record("withdraw", Some("0000000001"), Some("abc")), "amount")]
    #[case::balance_without_account(record("balance", None, None), "account_id")]
    #[case::unknown_operation(record("transfer", Some("0000000001"), Some("1")), "op")]
    fn test_convert_rejects_invalid_records(
        #[case] csv_record: CsvRecord,
        #[case] expected_field: &str,
    ) {
        let result = convert_csv_record(csv_record);

        match result {
            Err(LedgerError::InvalidInput { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("Expected InvalidInput on {expected_field}, got {other:?}"),
        }
    }

    #[test]
    fn test_write_accounts_csv_sorted_with_four_decimals() {
        let mut bob = Account::new(AccountId::from("0000000002"), "Bob", "N2", "P2");
        bob.balance = Decimal::new(2505, 1);
        let mut alice = Account::new(AccountId::from("0000000001"), "Alice", "N1", "P1");
        alice.balance = Decimal::new(70, 0);

        let mut output = Vec::new();
        write_accounts_csv(&[bob, alice], &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "account_id,name,national_id,phone,balance\n\
             0000000001,Alice,N1,P1,70.0000\n\
             0000000002,Bob,N2,P2,250.5000\n"
        );
    }

    #[test]
    fn test_write_accounts_csv_empty() {
        let mut output = Vec::new();
        write_accounts_csv(&[], &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "account_id,name,national_id,phone,balance\n"
        );
    }
}
