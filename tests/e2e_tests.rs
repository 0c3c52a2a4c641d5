//! End-to-end integration tests
//!
//! These tests drive the complete import pipeline: a statement file on
//! disk goes through the selected parser variant, classification against
//! a pre-seeded defaults store, scripted interactive review where needed,
//! and a ledger write, whose content is then checked against the source
//! statement order.
//!
//! Operator input is scripted through a cursor and progress output is
//! captured in a buffer, so the review loop runs exactly as it does
//! against a terminal.

use ledger_import::cli::Provider;
use ledger_import::core::{DefaultsStore, EngineConfig, ImportEngine};
use ledger_import::import::{create_importer, ImporterConfig, AMEX_HEADER};
use ledger_import::types::ImportError;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    output_path: PathBuf,
    defaults_path: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let output_path = dir.path().join("out.ledger");
        let defaults_path = dir.path().join("defaults.yaml");
        Fixture {
            dir,
            output_path,
            defaults_path,
        }
    }

    fn seed_defaults(&self, pairs: &[(&str, &str)]) {
        let mut store = DefaultsStore::load(&self.defaults_path).unwrap();
        for (vendor, account) in pairs {
            store.save_vendor(vendor, account);
        }
        store.persist().unwrap();
    }

    /// Run the pipeline over raw statement bytes with scripted answers
    fn run(
        &self,
        provider: Provider,
        statement: &[u8],
        answers: &str,
        resume: bool,
    ) -> (Result<(), ImportError>, String) {
        let defaults = Arc::new(Mutex::new(
            DefaultsStore::load(&self.defaults_path).unwrap(),
        ));
        let importer = create_importer(
            provider,
            statement.to_vec(),
            ImporterConfig {
                account: "Assets:Bank".to_string(),
                commodity: "AUD".to_string(),
            },
        );
        let engine = ImportEngine::new(
            EngineConfig {
                output_path: self.output_path.clone(),
                resume,
                format_command: None,
            },
            importer,
            Arc::clone(&defaults),
        );

        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = engine.run(&mut input, &mut output);
        // Mirror the normal-completion flush the binary relies on.
        defaults
            .lock()
            .unwrap()
            .persist()
            .expect("Failed to persist defaults");
        (result, String::from_utf8(output).unwrap())
    }

    fn ledger(&self) -> String {
        fs::read_to_string(&self.output_path).expect("Failed to read ledger output")
    }
}

fn amex_statement(rows: &[&str]) -> Vec<u8> {
    format!("{}\n{}", AMEX_HEADER, rows.join("\n")).into_bytes()
}

#[test]
fn test_amex_mixed_auto_and_manual_preserves_statement_order() {
    let fixture = Fixture::new();
    fixture.seed_defaults(&[("GROCER", "Expenses:Food")]);

    let statement = amex_statement(&[
        "01/02/2024,01/02/2024,COFFEE SHOP,12.50,,,,,,,,,,R1",
        "02/02/2024,02/02/2024,GROCER,40.00,,,,,,,,,,R2",
        "03/02/2024,03/02/2024,COFFEE SHOP,4.00,,,,,,,,,,R3",
    ]);

    // Gate line, then one answer covering both COFFEE SHOP rows.
    let (result, messages) = fixture.run(Provider::AmexCsv, &statement, "\nExpenses:Coffee\n", false);
    result.unwrap();

    assert!(messages.contains("Found 3 transactions."));
    assert!(messages.contains("Automatically identified 1 transactions."));
    assert!(messages.contains("1 vendor(s) requiring manual attribution."));

    let ledger = fixture.ledger();
    let first = ledger.find("COFFEE SHOP REF:R1").unwrap();
    let second = ledger.find("GROCER REF:R2").unwrap();
    let third = ledger.find("COFFEE SHOP REF:R3").unwrap();
    assert!(first < second && second < third);

    assert!(ledger.contains("2024-02-01 * \"COFFEE SHOP REF:R1\""));
    assert!(ledger.contains("\tAssets:Bank\t-12.50 AUD"));
    assert!(ledger.contains("\tExpenses:Coffee\t12.50 AUD"));
}

#[test]
fn test_learned_vendor_needs_no_prompt_on_the_next_import() {
    let fixture = Fixture::new();

    let statement = amex_statement(&["01/02/2024,01/02/2024,COFFEE SHOP,12.50,,,,,,,,,,R1"]);
    let (result, _) = fixture.run(Provider::AmexCsv, &statement, "\nExpenses:Food\n", false);
    result.unwrap();

    // Second import of the same vendor: zero interactive prompts.
    let statement = amex_statement(&["05/02/2024,05/02/2024,COFFEE SHOP,3.50,,,,,,,,,,R9"]);
    let (result, messages) = fixture.run(Provider::AmexCsv, &statement, "", false);
    result.unwrap();

    assert!(messages.contains("Automatically identified 1 transactions."));
    assert!(!messages.contains("Assign to Account"));
    assert!(fixture.ledger().contains("Expenses:Food"));
}

#[test]
fn test_ofx_statement_end_to_end() {
    let fixture = Fixture::new();
    fixture.seed_defaults(&[("COFFEE SHOP", "Expenses:Food")]);

    let statement = "\
<OFX><BANKMSGSRSV1><STMTTRNRS><STMTRS><BANKTRANLIST>\r\n\
<STMTTRN><TRNTYPE>DEBIT<DTPOSTED>20240201<TRNAMT>-12.50<FITID>T1\
<NAME>COFFEE SHOP</STMTTRN>\r\n\
<STMTTRN><TRNTYPE>DEBIT<DTPOSTED>20240202<TRNAMT>0.00<FITID>T2\
<NAME>CARD HOLD</STMTTRN>\r\n\
<STMTTRN><TRNTYPE>CREDIT<DTPOSTED>20240203<TRNAMT>1000.00<FITID>T3\
<MEMO>VISA-EMPLOYER SALARY Ref9981</STMTTRN>\r\n\
</BANKTRANLIST></STMTRS></STMTTRNRS></BANKMSGSRSV1></OFX>\r\n";

    let (result, messages) =
        fixture.run(Provider::Ofx, statement.as_bytes(), "\nIncome:Salary\n", false);
    result.unwrap();

    // The zero-amount hold is not imported at all.
    assert!(messages.contains("Found 2 transactions."));

    let ledger = fixture.ledger();
    assert!(ledger.contains("2024-02-01 * \"COFFEE SHOP REF:"));
    // Memo noise stripped, Ref token used as the reference.
    assert!(ledger.contains("\"EMPLOYER SALARY REF:Ref9981\""));
    assert!(ledger.contains("\tIncome:Salary\t-1000.00 AUD"));
    assert!(!ledger.contains("CARD HOLD"));
}

#[test]
fn test_crash_mid_review_then_resume_finishes_without_reprompting() {
    let fixture = Fixture::new();

    let statement = amex_statement(&[
        "01/02/2024,01/02/2024,COFFEE SHOP,12.50,,,,,,,,,,R1",
        "02/02/2024,02/02/2024,GROCER,40.00,,,,,,,,,,R2",
    ]);

    // The run dies after the first answer: the second vendor's read hits
    // end of input, exactly like a killed terminal.
    let (result, _) = fixture.run(Provider::AmexCsv, &statement, "\nExpenses:Coffee\n", false);
    assert!(matches!(result, Err(ImportError::InputRead { .. })));
    assert!(fixture.dir.path().join("out.ledger.session").exists());

    // Resume with an empty defaults store so only the session log can
    // account for the missing prompt.
    fs::remove_file(&fixture.defaults_path).unwrap();
    let (result, messages) = fixture.run(Provider::AmexCsv, &statement, "\nExpenses:Food\n", true);
    result.unwrap();

    assert!(messages.contains("Recovered 1 transactions from a previous session."));
    assert!(!messages.contains("\"COFFEE SHOP\""));

    let ledger = fixture.ledger();
    assert!(ledger.contains("\tExpenses:Coffee\t12.50 AUD"));
    assert!(ledger.contains("\tExpenses:Food\t40.00 AUD"));
    let coffee = ledger.find("COFFEE SHOP").unwrap();
    let grocer = ledger.find("GROCER").unwrap();
    assert!(coffee < grocer);

    // The log is gone once the ledger is safely written.
    assert!(!fixture.dir.path().join("out.ledger.session").exists());
}

#[test]
fn test_empty_statement_is_a_clean_error_not_an_empty_ledger() {
    let fixture = Fixture::new();
    let (result, _) = fixture.run(Provider::AmexCsv, b"", "", false);
    assert_eq!(result.unwrap_err(), ImportError::EmptyInput);
    assert!(!fixture.output_path.exists());
}

#[test]
fn test_header_mismatch_aborts_before_any_prompt() {
    let fixture = Fixture::new();
    let statement = b"Date,Amount\n01/02/2024,12.50\n".to_vec();
    let (result, messages) = fixture.run(Provider::AmexCsv, &statement, "", false);
    assert_eq!(result.unwrap_err(), ImportError::HeaderMismatch);
    assert!(messages.is_empty());
}
