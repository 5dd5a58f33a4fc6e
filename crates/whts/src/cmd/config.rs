use tracing::info;
use whts::message::backend_to_master::SlaveEntry;
use whts::store::{SlaveConfigRecord, SlaveConfigStore, StoreError};

use crate::cmd::{parse_u16, parse_u32, parse_u8, ConfigCommand, StoreArgs};
use crate::exit::{store_error, CliError, CliResult, SUCCESS};
use crate::output::{print_record, print_records, OutputFormat};

pub fn run(command: ConfigCommand, format: OutputFormat) -> CliResult<i32> {
    match command {
        ConfigCommand::List(store) => {
            let store = open(&store)?;
            print_records(store.list(), format);
        }
        ConfigCommand::Show { name, store } => {
            let store = open(&store)?;
            let record = store
                .get(&name)
                .ok_or_else(|| store_error("show failed", StoreError::NotFound(name.clone())))?;
            print_record(record, format);
        }
        ConfigCommand::Add {
            name,
            slaves,
            store,
        } => {
            let slaves = slaves
                .iter()
                .map(String::as_str)
                .map(parse_slave_spec)
                .collect::<CliResult<Vec<_>>>()?;
            let mut store = open(&store)?;
            let replaced = store.add(SlaveConfigRecord::new(name.clone(), slaves));
            save(&store)?;
            info!(%name, replaced, "stored slave configuration");
        }
        ConfigCommand::Remove { name, store } => {
            let mut store = open(&store)?;
            store
                .remove(&name)
                .map_err(|err| store_error("remove failed", err))?;
            save(&store)?;
            info!(%name, "removed slave configuration");
        }
        ConfigCommand::Copy { name, store } => {
            let mut store = open(&store)?;
            let copy = store
                .duplicate(&name)
                .map_err(|err| store_error("copy failed", err))?;
            save(&store)?;
            println!("{copy}");
        }
    }
    Ok(SUCCESS)
}

fn open(args: &StoreArgs) -> CliResult<SlaveConfigStore> {
    let path = SlaveConfigStore::default_path(args.store.as_deref());
    SlaveConfigStore::load(path).map_err(|err| store_error("failed to load store", err))
}

fn save(store: &SlaveConfigStore) -> CliResult<()> {
    store
        .save()
        .map_err(|err| store_error("failed to save store", err))
}

/// Parse `id[:conduction[:resistance[:clipMode[:clipStatus]]]]`.
///
/// Missing trailing fields default to zero.
fn parse_slave_spec(spec: &str) -> CliResult<SlaveEntry> {
    let fields: Vec<&str> = spec.split(':').map(str::trim).collect();
    if fields.is_empty() || fields[0].is_empty() || fields.len() > 5 {
        return Err(CliError::usage(format!(
            "invalid slave spec {spec:?} (expected id:conduction:resistance:clipMode:clipStatus)"
        )));
    }
    let bad = |err: String| CliError::usage(format!("invalid slave spec {spec:?}: {err}"));
    let field = |i: usize| fields.get(i).copied().unwrap_or("0");

    Ok(SlaveEntry {
        id: parse_u32(field(0)).map_err(bad)?,
        conduction_num: parse_u8(field(1)).map_err(bad)?,
        resistance_num: parse_u8(field(2)).map_err(bad)?,
        clip_mode: parse_u8(field(3)).map_err(bad)?,
        clip_status: parse_u16(field(4)).map_err(bad)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_slave_spec() {
        let entry = parse_slave_spec("0x1234:8:4:1:0x00FF").unwrap();
        assert_eq!(
            entry,
            SlaveEntry {
                id: 0x1234,
                conduction_num: 8,
                resistance_num: 4,
                clip_mode: 1,
                clip_status: 0x00FF,
            }
        );
    }

    #[test]
    fn short_slave_spec_defaults_to_zero() {
        let entry = parse_slave_spec("42").unwrap();
        assert_eq!(entry.id, 42);
        assert_eq!(entry.conduction_num, 0);
        assert_eq!(entry.clip_status, 0);
    }

    #[test]
    fn malformed_slave_specs() {
        assert!(parse_slave_spec("").is_err());
        assert!(parse_slave_spec("1:2:3:4:5:6").is_err());
        assert!(parse_slave_spec("1:300").is_err());
    }
}
