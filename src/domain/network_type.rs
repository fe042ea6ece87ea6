// Network type domain model - OS network-type codes to generation and technology labels

/// Data network types reported by the telephony stack, keyed by their raw code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkType {
    Gprs,
    Edge,
    Umts,
    Cdma,
    EvdoRev0,
    EvdoRevA,
    OneXRtt,
    Hsdpa,
    Hsupa,
    Hspa,
    Iden,
    EvdoRevB,
    Lte,
    Ehrpd,
    HspaPlus,
    Gsm,
    TdScdma,
    Iwlan,
    LteCa,
    Nr,
    LteAdvanced,
}

impl NetworkType {
    pub fn from_code(code: i32) -> Option<Self> {
        let network_type = match code {
            1 => NetworkType::Gprs,
            2 => NetworkType::Edge,
            3 => NetworkType::Umts,
            4 => NetworkType::Cdma,
            5 => NetworkType::EvdoRev0,
            6 => NetworkType::EvdoRevA,
            7 => NetworkType::OneXRtt,
            8 => NetworkType::Hsdpa,
            9 => NetworkType::Hsupa,
            10 => NetworkType::Hspa,
            11 => NetworkType::Iden,
            12 => NetworkType::EvdoRevB,
            13 => NetworkType::Lte,
            14 => NetworkType::Ehrpd,
            15 => NetworkType::HspaPlus,
            16 => NetworkType::Gsm,
            17 => NetworkType::TdScdma,
            18 => NetworkType::Iwlan,
            19 => NetworkType::LteCa,
            20 => NetworkType::Nr,
            30 => NetworkType::LteAdvanced,
            _ => return None,
        };
        Some(network_type)
    }

    /// Generation bucket, `None` for types without one
    pub fn generation(&self) -> Option<&'static str> {
        use NetworkType::*;
        match self {
            Gprs | Edge | Cdma | OneXRtt | Iden | Gsm => Some("2G"),
            Umts | EvdoRev0 | EvdoRevA | Hsdpa | Hsupa | Hspa | EvdoRevB | Ehrpd | HspaPlus
            | TdScdma => Some("3G"),
            Lte | Iwlan | LteCa => Some("4G"),
            Nr => Some("5G"),
            LteAdvanced => None,
        }
    }

    pub fn technology(&self) -> &'static str {
        use NetworkType::*;
        match self {
            Gprs => "GPRS",
            Edge => "EDGE",
            Umts => "UMTS",
            Cdma => "CDMA",
            OneXRtt => "1xRTT",
            Iden => "iDEN",
            EvdoRev0 => "EVDO rev. 0",
            EvdoRevA => "EVDO rev. A",
            Hsdpa => "HSDPA",
            Hsupa => "HSUPA",
            Hspa => "HSPA",
            HspaPlus => "HSPA+",
            EvdoRevB => "EVDO rev. B",
            Ehrpd => "eHRPD",
            TdScdma => "TD-SCDMA",
            Lte => "LTE",
            LteCa => "LTE-CA",
            LteAdvanced => "LTE-Advanced",
            Iwlan => "IWLAN",
            Nr => "NR (5G)",
            Gsm => "GSM",
        }
    }
}

fn unknown_code(code: i32) -> String {
    format!("UNKNOWN ({})", code)
}

/// "2G".."5G", "CELLULAR" for known codes without a generation, or
/// "UNKNOWN (code)" for codes outside the table.
pub fn classify_generation(code: i32) -> String {
    match NetworkType::from_code(code) {
        Some(network_type) => network_type.generation().unwrap_or("CELLULAR").to_string(),
        None => unknown_code(code),
    }
}

pub fn classify_technology(code: i32) -> String {
    match NetworkType::from_code(code) {
        Some(network_type) => network_type.technology().to_string(),
        None => unknown_code(code),
    }
}

/// Active transport of the device's default network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Wifi,
    Cellular(i32),
    Disconnected,
    Other,
}

pub fn classify_connection(transport: Transport) -> String {
    match transport {
        Transport::Wifi => "WIFI".to_string(),
        Transport::Cellular(code) => classify_generation(code),
        Transport::Disconnected => "Not Connected".to_string(),
        Transport::Other => "UNKNOWN".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_generation() {
        assert_eq!(classify_generation(13), "4G");
        assert_eq!(classify_generation(18), "4G");
        assert_eq!(classify_generation(19), "4G");
        assert_eq!(classify_generation(20), "5G");
        assert_eq!(classify_generation(16), "2G");
        assert_eq!(classify_generation(2), "2G");
        assert_eq!(classify_generation(15), "3G");
        assert_eq!(classify_generation(17), "3G");
    }

    #[test]
    fn test_known_code_without_generation_is_cellular() {
        assert_eq!(classify_generation(30), "CELLULAR");
    }

    #[test]
    fn test_unknown_codes_carry_raw_value() {
        assert_eq!(classify_generation(9999), "UNKNOWN (9999)");
        assert_eq!(classify_generation(0), "UNKNOWN (0)");
        assert_eq!(classify_technology(-3), "UNKNOWN (-3)");
    }

    #[test]
    fn test_classify_technology() {
        assert_eq!(classify_technology(13), "LTE");
        assert_eq!(classify_technology(20), "NR (5G)");
        assert_eq!(classify_technology(15), "HSPA+");
        assert_eq!(classify_technology(30), "LTE-Advanced");
    }

    #[test]
    fn test_classify_connection() {
        assert_eq!(classify_connection(Transport::Wifi), "WIFI");
        assert_eq!(classify_connection(Transport::Cellular(20)), "5G");
        assert_eq!(classify_connection(Transport::Disconnected), "Not Connected");
        assert_eq!(classify_connection(Transport::Other), "UNKNOWN");
    }
}
