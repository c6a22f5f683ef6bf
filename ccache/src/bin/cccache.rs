use ccache::{
    prefix_progname_to_error_if_needed, str_conv, Address, CCacheFile, Context, Credential,
    CredentialCache, ADDRTYPE_INET, ADDRTYPE_INET6,
};
use chrono::Utc;
use clap::{ArgAction, CommandFactory, Parser};
use dns_lookup::lookup_addr;
use once_cell::sync::Lazy;
use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    process::ExitCode,
};

const PROGNAME: &str = "cccache";

static ARGS: Lazy<Args> = Lazy::new(Args::parse);
static NOW: Lazy<i64> = Lazy::new(|| Utc::now().timestamp());
static TIMESTAMP_WIDTH: Lazy<usize> =
    Lazy::new(|| str_conv::timestamp_to_sfstring(*NOW as u32).len());

#[derive(Parser)]
#[command(name = PROGNAME, version)]
struct Args {
    /// dumps every credential field and logs decoding details (repeat for more)
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,
    /// shows credentials flags
    #[arg(short = 'f', default_value_t = false)]
    show_flags: bool,
    /// shows the session key encryption type
    #[arg(short = 'e', default_value_t = false)]
    show_etype: bool,
    /// shows the submitted authorization data types
    #[arg(short = 'd', default_value_t = false)]
    show_adtype: bool,
    /// displays the address list
    #[arg(short = 'a', default_value_t = false)]
    show_addresses: bool,
    /// do not reverse-resolve
    #[arg(short = 'n', default_value_t = false)]
    no_resolve: bool,
    /// sets exit status based on valid tgt existence
    #[arg(short = 's', default_value_t = false)]
    status_only: bool,
    /// includes configuration data entries
    #[arg(short = 'C', default_value_t = false)]
    show_config: bool,

    /// credential cache name (Default is credentials cache)
    name: Option<String>,
}

fn main() -> ExitCode {
    init_logger();
    prefix_progname_to_error_if_needed(PROGNAME, run(), ARGS.status_only)
}

fn init_logger() {
    let level = match ARGS.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run() -> anyhow::Result<()> {
    if ARGS.no_resolve && !ARGS.show_addresses {
        return usage();
    }

    // Forces the evaluation of lazy static value `NOW` to use current time
    let _ = *NOW;

    let mut context =
        Context::init().map_err(|e| anyhow::anyhow!("{} while initializing krb5", e))?;
    if let Some(name) = &ARGS.name {
        context.set_default_ccname(name);
    }

    let cache = CredentialCache::default(&mut context)
        .map_err(|e| anyhow::anyhow!("{} while resolving ccache", e))?;
    let ccache = cache.read().map_err(|e| {
        anyhow::anyhow!("{} while reading ccache {}", e, cache.get_full_name())
    })?;

    if ARGS.status_only {
        check_ccache(&ccache)
    } else {
        show_ccache(&cache, &ccache)
    }
}

fn usage() -> anyhow::Result<()> {
    Err(anyhow::anyhow!(Args::command().render_help()))
}

fn check_ccache(ccache: &CCacheFile) -> anyhow::Result<()> {
    let realm = &ccache.default_principal.realm;
    let mut found_tgt = false;
    let mut found_current_tgt = false;
    let mut found_current_cred = false;
    for credential in &ccache.credentials {
        if credential.server.is_local_tgt(realm) {
            found_tgt = true;
            if credential.times.endtime as i64 > *NOW {
                found_current_tgt = true;
            }
        } else if !credential.is_config() && credential.times.endtime as i64 > *NOW {
            found_current_cred = true;
        }
    }
    if (found_tgt && found_current_tgt) || (!found_tgt && found_current_cred) {
        Ok(())
    } else {
        Err(anyhow::anyhow!(""))
    }
}

fn show_ccache(cache: &CredentialCache, ccache: &CCacheFile) -> anyhow::Result<()> {
    let default_name = ccache.default_principal.unparse_name();
    println!("Ticket cache: {}", cache.get_full_name());
    println!("Default principal: {}", default_name);
    if ARGS.verbose > 0 {
        if let Some((seconds, microseconds)) = ccache.header.kdc_time_offset() {
            println!("KDC time offset: {}s {}us", seconds, microseconds);
        }
    }
    println!();
    println!(
        "Valid starting{}  Expires{}  Service principal",
        " ".repeat(TIMESTAMP_WIDTH.saturating_sub("Valid starting".len())),
        " ".repeat(TIMESTAMP_WIDTH.saturating_sub("Expires".len()))
    );
    for credential in &ccache.credentials {
        if ARGS.show_config || !credential.is_config() {
            show_credential(credential, &default_name)?;
        }
    }
    Ok(())
}

fn show_credential(credential: &Credential, default_name: &str) -> anyhow::Result<()> {
    let name = credential.client.unparse_name();
    let sname = credential.server.unparse_name();
    let starttime = match credential.times.starttime {
        0 => credential.times.authtime,
        starttime => starttime,
    };

    if let Some((key, principal, value)) = credential.get_config() {
        show_config(key, principal, value);
    } else {
        println!(
            "{}  {}  {}",
            str_conv::timestamp_to_sfstring(starttime),
            str_conv::timestamp_to_sfstring(credential.times.endtime),
            sname
        );
    }

    let mut extra_field = 0;
    let prefix = |extra_field: i32| if extra_field == 0 { "\t" } else { ", " };
    if name != default_name {
        print!("{}for client {}", prefix(extra_field), name);
        extra_field += 1;
    }
    if credential.times.renew_till != 0 {
        print!(
            "{}renew until {}",
            prefix(extra_field),
            str_conv::timestamp_to_sfstring(credential.times.renew_till)
        );
        extra_field += 2;
    }
    if ARGS.show_flags {
        let flags = str_conv::flags_string(credential.ticket_flags);
        if !flags.is_empty() {
            print!("{}Flags: {}", prefix(extra_field), flags);
            extra_field += 1;
        }
    }
    if extra_field > 2 {
        println!();
        extra_field = 0;
    }
    if ARGS.show_etype {
        print!(
            "{}Etype (skey): {}",
            prefix(extra_field),
            str_conv::enctype_name(credential.keyblock.enctype())
        );
        extra_field += 1;
    }
    if ARGS.show_adtype {
        let ad_types: Vec<String> = credential
            .authdata
            .iter()
            .map(|ad| str_conv::adtype_name(ad.tag))
            .collect();
        print!("{}AD types: {}", prefix(extra_field), ad_types.join(", "));
        extra_field += 1;
    }
    if extra_field > 0 {
        println!();
    }
    if ARGS.show_addresses {
        if credential.addresses.is_empty() {
            println!("\tAddresses: (none)");
        } else {
            let addresses: Vec<String> = credential.addresses.iter().map(one_addr).collect();
            println!("\tAddresses: {}", addresses.join(", "));
        }
    }
    if ARGS.verbose > 0 {
        for line in str_conv::credential_details(credential) {
            println!("\t\t{}", line);
        }
        println!();
    }
    Ok(())
}

fn show_config(key: &[u8], principal: Option<&Vec<u8>>, value: &[u8]) {
    let mut output = format!("config: {}", String::from_utf8_lossy(key));
    if let Some(principal) = principal {
        output.push_str(&format!("({})", String::from_utf8_lossy(principal)));
    }
    output.push_str(" = ");
    print!("{}", output);
    let mut config_row_length = output.len();

    for byte in value {
        if config_row_length < 8 {
            print!("{}", " ".repeat(8 - config_row_length));
            config_row_length = 8;
        }
        if *byte > 0x20 && *byte < 0x7f {
            print!("{}", *byte as char);
            config_row_length += 1;
        } else {
            print!("\\{:0>3o}", byte);
            config_row_length += 4;
        }
        if config_row_length > 72 {
            println!();
            config_row_length = 0;
        }
    }
    if config_row_length > 0 {
        println!();
    }
}

fn one_addr(address: &Address) -> String {
    let ip_addr = match (address.tag, address.contents.len()) {
        (ADDRTYPE_INET, 4) => {
            let octets: [u8; 4] = address.contents[..].try_into().unwrap_or_default();
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        (ADDRTYPE_INET6, 16) => {
            let octets: [u8; 16] = address.contents[..].try_into().unwrap_or_default();
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        (ADDRTYPE_INET, length) | (ADDRTYPE_INET6, length) => {
            return format!("broken address (type {} length {})", address.tag, length);
        }
        (addrtype, _) => {
            return format!("unknown {}", str_conv::addrtype_name(addrtype));
        }
    };
    if ARGS.no_resolve {
        ip_addr.to_string()
    } else {
        lookup_addr(&ip_addr).unwrap_or_else(|_| ip_addr.to_string())
    }
}
