//! Record commands: members, equal, merge, copy

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;

use super::output::Output;
use crate::engine::{Engine, SkippedNode};
use crate::model::{Address, Company, Person, Record, RecordKind, User};
use crate::storage::RecordFile;

/// Runs `$body` with `$r` bound to the record type named by `$kind`
macro_rules! for_kind {
    ($kind:expr, $r:ident => $body:expr) => {
        match $kind {
            RecordKind::Address => {
                type $r = Address;
                $body
            }
            RecordKind::Person => {
                type $r = Person;
                $body
            }
            RecordKind::Company => {
                type $r = Company;
                $body
            }
            RecordKind::User => {
                type $r = User;
                $body
            }
        }
    };
}

#[derive(Serialize)]
struct MemberRow {
    name: &'static str,
    declared: &'static str,
    kind: &'static str,
    optional: bool,
}

#[derive(Serialize)]
struct SkippedRow {
    path: String,
    reason: String,
}

fn skipped_rows(skipped: &[SkippedNode]) -> Vec<SkippedRow> {
    skipped
        .iter()
        .map(|s| SkippedRow {
            path: s.path.clone(),
            reason: s.reason.to_string(),
        })
        .collect()
}

fn open(path: &Path) -> Result<RecordFile> {
    RecordFile::new(path).with_context(|| format!("Cannot open record: {}", path.display()))
}

/// Lists the member table of a record type
pub fn members(output: &Output, kind: RecordKind) {
    let desc = kind.descriptor();
    let rows: Vec<MemberRow> = desc
        .members()
        .iter()
        .map(|m| MemberRow {
            name: m.name(),
            declared: m.declared().name,
            kind: m.kind().as_str(),
            optional: m.is_optional(),
        })
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "kind": kind,
            "type": desc.name(),
            "members": rows,
        }));
        return;
    }

    output.row(&["MEMBER", "KIND", "OPTIONAL", "TYPE"]);
    for row in &rows {
        output.row(&[
            row.name,
            row.kind,
            if row.optional { "yes" } else { "no" },
            row.declared,
        ]);
    }
}

/// Compares two record files
pub fn equal(output: &Output, engine: &Engine, kind: RecordKind, a: &Path, b: &Path) -> Result<ExitCode> {
    let same = for_kind!(kind, R => {
        let left: R = open(a)?.load()?;
        let right: R = open(b)?.load()?;
        engine.equal(&left, &right)
    });

    output.verbose_ctx("equal", &format!("{} vs {}", a.display(), b.display()));
    if output.is_json() {
        output.data(&serde_json::json!({ "kind": kind, "equal": same }));
    } else {
        output.success(if same { "equal" } else { "different" });
    }

    Ok(if same { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

/// Merges `source` into `target`, printing or writing the result
pub fn merge(
    output: &Output,
    engine: &Engine,
    kind: RecordKind,
    source: &Path,
    target: &Path,
    write: bool,
) -> Result<()> {
    for_kind!(kind, R => merge_records::<R>(output, engine, source, target, write))
}

fn merge_records<R: Record>(
    output: &Output,
    engine: &Engine,
    source: &Path,
    target: &Path,
    write: bool,
) -> Result<()> {
    let source_file = open(source)?;
    let target_file = open(target)?;
    let incoming: R = source_file.load()?;
    let mut record: R = target_file.load()?;

    let summary = engine
        .merge_report(&incoming, &mut record)
        .with_context(|| format!("Failed to merge {} into {}", source.display(), target.display()))?;

    for path in &summary.changed {
        output.verbose_ctx("merge", &format!("changed {}", path));
    }
    for skipped in &summary.skipped {
        output.warn(&format!("not merged: {}", skipped));
    }

    if write {
        if !summary.is_unchanged() {
            target_file.save(&record)?;
        }
        if output.is_json() {
            output.data(&serde_json::json!({
                "kind": R::KIND,
                "written": target.display().to_string(),
                "changed": summary.changed,
                "skipped": skipped_rows(&summary.skipped),
            }));
        } else {
            output.success(&format!(
                "Merged {} into {} ({} change(s))",
                source.display(),
                target.display(),
                summary.changed.len()
            ));
        }
        return Ok(());
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "kind": R::KIND,
            "record": record,
            "changed": summary.changed,
            "skipped": skipped_rows(&summary.skipped),
        }));
    } else {
        output.text(&target_file.format().encode(&record)?);
    }
    Ok(())
}

/// Deep-copies a record file
pub fn copy(output: &Output, engine: &Engine, kind: RecordKind, file: &Path, dest: Option<&Path>) -> Result<()> {
    for_kind!(kind, R => copy_record::<R>(output, engine, file, dest))
}

fn copy_record<R: Record>(output: &Output, engine: &Engine, file: &Path, dest: Option<&Path>) -> Result<()> {
    let source_file = open(file)?;
    let record: R = source_file.load()?;

    let copied = engine
        .copy(&record)
        .with_context(|| format!("Failed to copy {}", file.display()))?;

    for skipped in copied.skipped() {
        output.warn(&format!("not copied: {}", skipped));
    }
    let skipped = skipped_rows(copied.skipped());
    let copy = copied.into_value();

    if let Some(dest) = dest {
        open(dest)?.save(&copy)?;
        if output.is_json() {
            output.data(&serde_json::json!({
                "kind": R::KIND,
                "written": dest.display().to_string(),
                "skipped": skipped,
            }));
        } else {
            output.success(&format!("Copied {} to {}", file.display(), dest.display()));
        }
        return Ok(());
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "kind": R::KIND,
            "record": copy,
            "skipped": skipped,
        }));
    } else {
        output.text(&source_file.format().encode(&copy)?);
    }
    Ok(())
}
