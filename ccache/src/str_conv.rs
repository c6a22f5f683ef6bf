use crate::{
    Credential, Enctype, Flags, Timestamp, AD_TYPE_AND_OR, AD_TYPE_IF_RELEVANT,
    AD_TYPE_KDC_ISSUED, AD_TYPE_MANDATORY_FOR_KDC, AD_TYPE_WIN2K_PAC, ADDRTYPE_ADDRPORT,
    ADDRTYPE_CHAOS, ADDRTYPE_DDP, ADDRTYPE_INET, ADDRTYPE_INET6, ADDRTYPE_IPPORT, ADDRTYPE_ISO,
    ADDRTYPE_XNS,
};
use chrono::{Local, TimeZone};
use std::net::{Ipv4Addr, Ipv6Addr};

const FLAG_NAMES: [(Flags, &str); 15] = [
    (Credential::TKT_FLG_FORWARDABLE, "FORWARDABLE"),
    (Credential::TKT_FLG_FORWARDED, "FORWARDED"),
    (Credential::TKT_FLG_PROXIABLE, "PROXIABLE"),
    (Credential::TKT_FLG_PROXY, "PROXY"),
    (Credential::TKT_FLG_MAY_POSTDATE, "MAY_POSTDATE"),
    (Credential::TKT_FLG_POSTDATED, "POSTDATED"),
    (Credential::TKT_FLG_INVALID, "INVALID"),
    (Credential::TKT_FLG_RENEWABLE, "RENEWABLE"),
    (Credential::TKT_FLG_INITIAL, "INITIAL"),
    (Credential::TKT_FLG_PRE_AUTH, "PRE_AUTH"),
    (Credential::TKT_FLG_HW_AUTH, "HW_AUTH"),
    (Credential::TKT_FLG_TRANSIT_POLICY_CHECKED, "TRANSIT_POLICY_CHECKED"),
    (Credential::TKT_FLG_OK_AS_DELEGATE, "OK_AS_DELEGATE"),
    (Credential::TKT_FLG_ENC_PA_REP, "ENC_PA_REP"),
    (Credential::TKT_FLG_ANONYMOUS, "ANONYMOUS"),
];

// klist's order, which differs from the bit order around HW_AUTH.
const FLAG_LETTERS: [(Flags, char); 14] = [
    (Credential::TKT_FLG_FORWARDABLE, 'F'),
    (Credential::TKT_FLG_FORWARDED, 'f'),
    (Credential::TKT_FLG_PROXIABLE, 'P'),
    (Credential::TKT_FLG_PROXY, 'p'),
    (Credential::TKT_FLG_MAY_POSTDATE, 'D'),
    (Credential::TKT_FLG_POSTDATED, 'd'),
    (Credential::TKT_FLG_INVALID, 'i'),
    (Credential::TKT_FLG_RENEWABLE, 'R'),
    (Credential::TKT_FLG_INITIAL, 'I'),
    (Credential::TKT_FLG_HW_AUTH, 'H'),
    (Credential::TKT_FLG_PRE_AUTH, 'A'),
    (Credential::TKT_FLG_TRANSIT_POLICY_CHECKED, 'T'),
    (Credential::TKT_FLG_OK_AS_DELEGATE, 'O'),
    (Credential::TKT_FLG_ANONYMOUS, 'a'),
];

const ENCTYPE_NAMES: [(Enctype, &str); 15] = [
    (0x0001, "des-cbc-crc"),
    (0x0002, "des-cbc-md4"),
    (0x0003, "des-cbc-md5"),
    (0x0004, "des-cbc-raw"),
    (0x0006, "des3-cbc-raw"),
    (0x0008, "des-hmac-sha1"),
    (0x0010, "des3-cbc-sha1"),
    (0x0011, "aes128-cts-hmac-sha1-96"),
    (0x0012, "aes256-cts-hmac-sha1-96"),
    (0x0013, "aes128-cts-hmac-sha256-128"),
    (0x0014, "aes256-cts-hmac-sha384-192"),
    (0x0017, "arcfour-hmac"),
    (0x0018, "arcfour-hmac-exp"),
    (0x0019, "camellia128-cts-cmac"),
    (0x001a, "camellia256-cts-cmac"),
];

const ADDRTYPE_NAMES: [(u16, &str); 8] = [
    (ADDRTYPE_INET, "IPv4"),
    (ADDRTYPE_CHAOS, "CHAOS"),
    (ADDRTYPE_XNS, "XNS"),
    (ADDRTYPE_ISO, "ISO"),
    (ADDRTYPE_DDP, "DDP"),
    (ADDRTYPE_INET6, "IPv6"),
    (ADDRTYPE_ADDRPORT, "ADDRPORT"),
    (ADDRTYPE_IPPORT, "IPPORT"),
];

const AD_TYPE_NAMES: [(u16, &str); 5] = [
    (AD_TYPE_IF_RELEVANT, "if-relevant"),
    (AD_TYPE_KDC_ISSUED, "kdc-issued"),
    (AD_TYPE_AND_OR, "and-or"),
    (AD_TYPE_MANDATORY_FOR_KDC, "mandatory-for-kdc"),
    (AD_TYPE_WIN2K_PAC, "win2k-pac"),
];

/// Names of the flags set in `flags`, most significant bit first.
pub fn flags_to_names(flags: Flags) -> Vec<&'static str> {
    FLAG_NAMES
        .iter()
        .filter(|(flag, _)| flags & flag != 0)
        .map(|(_, name)| *name)
        .collect()
}

pub fn flags_string(flags: Flags) -> String {
    FLAG_LETTERS
        .iter()
        .filter(|(flag, _)| flags & flag != 0)
        .map(|(_, letter)| letter)
        .collect()
}

/// Local time rendering of an epoch timestamp; an unset (zero) time is shown
/// as `0`.
pub fn format_timestamp(timestamp: Timestamp) -> String {
    if timestamp == 0 {
        return "0".to_owned();
    }
    match Local.timestamp_opt(timestamp.into(), 0).single() {
        Some(time) => time.format("%a %Y-%m-%d %H:%M:%S %Z").to_string(),
        None => timestamp.to_string(),
    }
}

pub fn timestamp_to_sfstring(timestamp: Timestamp) -> String {
    match Local.timestamp_opt(timestamp.into(), 0).single() {
        Some(time) => time.format("%x %X").to_string(),
        None => timestamp.to_string(),
    }
}

pub fn enctype_name(enctype: Enctype) -> String {
    match ENCTYPE_NAMES.iter().find(|(etype, _)| *etype == enctype) {
        Some((_, name)) => (*name).to_owned(),
        None => format!("etype {}", enctype),
    }
}

pub fn addrtype_name(addrtype: u16) -> String {
    match ADDRTYPE_NAMES.iter().find(|(tag, _)| *tag == addrtype) {
        Some((_, name)) => (*name).to_owned(),
        None => format!("addrtype {}", addrtype),
    }
}

pub fn adtype_name(ad_type: u16) -> String {
    match AD_TYPE_NAMES.iter().find(|(tag, _)| *tag == ad_type) {
        Some((_, name)) => (*name).to_owned(),
        None => ad_type.to_string(),
    }
}

fn address_value(tag: u16, contents: &[u8]) -> String {
    if let (ADDRTYPE_INET, Ok(octets)) = (tag, <[u8; 4]>::try_from(contents)) {
        return Ipv4Addr::from(octets).to_string();
    }
    if let (ADDRTYPE_INET6, Ok(octets)) = (tag, <[u8; 16]>::try_from(contents)) {
        return Ipv6Addr::from(octets).to_string();
    }
    contents.iter().map(|byte| format!("{:02x}", byte)).collect()
}

/// One line per field of `credential`: the four times, `is_skey`, the flags
/// by name, then the keyblock, addresses, authorization data and tickets.
pub fn credential_details(credential: &Credential) -> Vec<String> {
    let times = &credential.times;
    let mut lines = vec![
        format!("Auth time: {}", format_timestamp(times.authtime)),
        format!("Start time: {}", format_timestamp(times.starttime)),
        format!("End time: {}", format_timestamp(times.endtime)),
        format!("Renew till: {}", format_timestamp(times.renew_till)),
        format!("is_skey: {}", credential.is_skey as u8),
        format!(
            "Flags: {:x} ({})",
            credential.ticket_flags,
            flags_to_names(credential.ticket_flags).join("|")
        ),
        format!(
            "Keyblock: {} ({} bytes)",
            enctype_name(credential.keyblock.enctype()),
            credential.keyblock.contents.len()
        ),
    ];
    for address in &credential.addresses {
        lines.push(format!(
            "Address: {} {}",
            addrtype_name(address.tag),
            address_value(address.tag, &address.contents)
        ));
    }
    for authdata in &credential.authdata {
        lines.push(format!(
            "AD: {} ({} bytes)",
            adtype_name(authdata.tag),
            authdata.contents.len()
        ));
    }
    lines.push(format!("Ticket: {} bytes", credential.ticket.len()));
    if !credential.second_ticket.is_empty() {
        lines.push(format!(
            "Second ticket: {} bytes",
            credential.second_ticket.len()
        ));
    }
    lines
}
