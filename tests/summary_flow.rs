use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

fn catat_cmd(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("catat"));
    cmd.env("CATAT_HOME", home.path());
    cmd.env_remove("CATAT_USER");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run_ok(home: &tempfile::TempDir, args: &[&str]) {
    let mut cmd = catat_cmd(home);
    cmd.args(args);
    cmd.assert().success();
}

fn run_ok_out(home: &tempfile::TempDir, args: &[&str]) -> String {
    let mut cmd = catat_cmd(home);
    cmd.args(args);
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).expect("utf8 stdout")
}

fn ledger_db_path(home: &Path) -> PathBuf {
    home.join("data")
        .join("ledgers")
        .join("pengeluaran")
        .join("catat.sqlite3")
}

fn seed_august(home: &tempfile::TempDir) {
    for (at, text) in [
        ("2025-08-01T12:00:00", "makan 25000 nasi goreng"),
        ("2025-08-02T12:00:00", "makan 25000 nasi goreng"),
        ("2025-08-03T07:00:00", "transport 10000 ojek"),
    ] {
        run_ok(home, &["add", "--user", "42", "--at", at, text]);
    }
    run_ok(
        home,
        &["add", "--user", "7", "--at", "2025-08-03T09:00:00", "belanja 99000 sepatu"],
    );
}

#[test]
fn month_view_shows_average_and_ranked_percentages() {
    let home = tempfile::tempdir().expect("tempdir");
    seed_august(&home);

    let out = run_ok_out(&home, &["month", "--user", "42", "--at", "2025-08-03T21:00:00"]);
    assert!(out.contains("📅 Bulan: August 2025"));
    assert!(out.contains("📝 Total transaksi: 3"));
    assert!(out.contains("💰 Total pengeluaran: Rp 60,000"));
    assert!(out.contains("📊 Rata-rata per hari: Rp 20,000"));

    let makan = out.find("🍽️ Makan: Rp 50,000 (83.3%)").expect("makan");
    let transport = out.find("🚗 Transport: Rp 10,000 (16.7%)").expect("transport");
    assert!(makan < transport);
    assert!(out.contains("🛒 Belanja: Rp 0 (0.0%)"));
}

#[test]
fn today_view_is_scoped_to_the_day_and_user() {
    let home = tempfile::tempdir().expect("tempdir");
    seed_august(&home);

    let out = run_ok_out(&home, &["today", "--user", "42", "--at", "2025-08-02T22:00:00"]);
    assert!(out.contains("📅 Tanggal: 02 August 2025"));
    assert!(out.contains("📝 Jumlah transaksi: 1"));
    assert!(out.contains("💰 Total pengeluaran: Rp 25,000"));
    assert!(!out.contains("Transport"));

    let empty = run_ok_out(&home, &["today", "--user", "42", "--at", "2025-08-10T10:00:00"]);
    assert_eq!(empty.trim(), "📊 Belum ada pengeluaran hari ini.");
}

#[test]
fn ringkasan_combines_daily_and_monthly() {
    let home = tempfile::tempdir().expect("tempdir");
    seed_august(&home);

    let out = run_ok_out(
        &home,
        &["ringkasan", "--user", "42", "--at", "2025-08-03T21:00:00"],
    );
    let daily = out.find("RINGKASAN PENGELUARAN HARI INI").expect("daily");
    let rule = out.find(&"=".repeat(40)).expect("rule");
    let monthly = out.find("RINGKASAN PENGELUARAN BULAN INI").expect("monthly");
    assert!(daily < rule && rule < monthly);

    let nobody = run_ok_out(
        &home,
        &["summary", "--user", "99", "--at", "2025-08-03T21:00:00"],
    );
    assert!(nobody.contains("📊 Belum ada pengeluaran hari ini."));
    assert!(nobody.contains("📊 Belum ada pengeluaran bulan ini."));
}

#[test]
fn hand_edited_rows_are_read_defensively() {
    let home = tempfile::tempdir().expect("tempdir");
    seed_august(&home);

    let conn = rusqlite::Connection::open(ledger_db_path(home.path())).expect("open db");
    conn.execute_batch(
        r#"
        INSERT INTO ledger (tanggal, waktu, kategori, deskripsi, jumlah, user_id, status)
        VALUES ('2025-08-03', '10:00:00', 'Kesehatan', 'vitamin', 'Rp 15.000', 42, 'manual');
        INSERT INTO ledger (tanggal, waktu, kategori, deskripsi, jumlah, user_id, status)
        VALUES ('2025-08-03', '11:00:00', 'Hiburan', 'gratis', 'n/a', 42, 'manual');
        INSERT INTO ledger (tanggal, waktu, kategori, deskripsi, jumlah, user_id, status)
        VALUES ('03/08/2025', '11:00:00', 'Makan', 'format lain', 70000, 42, 'manual');
        "#,
    )
    .expect("hand edits");

    let out = run_ok_out(&home, &["month", "--user", "42", "--at", "2025-08-03T21:00:00"]);
    assert!(out.contains("📝 Total transaksi: 5"));
    assert!(out.contains("💰 Total pengeluaran: Rp 75,000"));
    assert!(out.contains("💊 Kesehatan: Rp 15,000"));
    assert!(out.contains("🎮 Hiburan: Rp 0"));
}

#[test]
fn ledger_can_be_filtered_by_month() {
    let home = tempfile::tempdir().expect("tempdir");
    seed_august(&home);
    run_ok(
        &home,
        &["add", "--user", "42", "--at", "2025-09-01T08:00:00", "makan 12000 bubur"],
    );

    let sept = run_ok_out(&home, &["ledger", "--month", "2025-09"]);
    assert!(sept.contains("bubur"));
    assert!(!sept.contains("nasi goreng"));

    let mut cmd = catat_cmd(&home);
    cmd.args(["ledger", "--month", "2025-13"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --month"));
}

#[test]
fn guide_and_start_print_help_texts() {
    let home = tempfile::tempdir().expect("tempdir");

    let guide = run_ok_out(&home, &["guide"]);
    assert!(guide.contains("catat add makan 25000 nasi goreng"));

    let start = run_ok_out(&home, &["start", "--name", "Sari"]);
    assert!(start.contains("Halo Sari!"));
}
