// Radio channel domain model - channel number to carrier frequency and band
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returned by frequency resolution when a channel falls outside every range
pub const UNRESOLVED_FREQUENCY_MHZ: f64 = -1.0;

/// Returned by band resolution when a channel falls outside every range
pub const UNKNOWN_BAND: &str = "Unknown";

/// Radio access technology; selects which channel table applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Rat {
    Gsm,
    Wcdma,
    Lte,
    Nr,
}

impl Rat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rat::Gsm => "GSM",
            Rat::Wcdma => "WCDMA",
            Rat::Lte => "LTE",
            Rat::Nr => "NR",
        }
    }

    fn table(&self) -> &'static [ChannelRange] {
        match self {
            Rat::Gsm => GSM_ARFCN,
            Rat::Wcdma => WCDMA_UARFCN,
            Rat::Lte => LTE_EARFCN,
            Rat::Nr => NR_ARFCN,
        }
    }
}

impl fmt::Display for Rat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown radio access technology: {0}")]
pub struct UnknownRat(pub String);

impl FromStr for Rat {
    type Err = UnknownRat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GSM" => Ok(Rat::Gsm),
            "WCDMA" | "UMTS" => Ok(Rat::Wcdma),
            "LTE" => Ok(Rat::Lte),
            "NR" | "5G" => Ok(Rat::Nr),
            _ => Err(UnknownRat(s.to_string())),
        }
    }
}

impl TryFrom<String> for Rat {
    type Error = UnknownRat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A contiguous block of channel numbers sharing one linear frequency formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelRange {
    pub start: i64,
    pub end: i64,
    pub base_mhz: f64,
    pub step_mhz: f64,
    pub label: &'static str,
}

impl ChannelRange {
    pub const fn new(start: i64, end: i64, base_mhz: f64, step_mhz: f64, label: &'static str) -> Self {
        Self {
            start,
            end,
            base_mhz,
            step_mhz,
            label,
        }
    }

    pub fn contains(&self, channel: i64) -> bool {
        (self.start..=self.end).contains(&channel)
    }

    pub fn frequency_mhz(&self, channel: i64) -> f64 {
        self.base_mhz + self.step_mhz * (channel - self.start) as f64
    }
}

pub const GSM_ARFCN: &[ChannelRange] = &[
    ChannelRange::new(0, 124, 935.0, 0.2, "GSM 900"),
    ChannelRange::new(975, 1023, 925.2, 0.2, "E-GSM 900"),
    ChannelRange::new(512, 885, 1930.0, 0.2, "PCS 1900"),
];

// Band VI sits inside Band V and the Band VII uplink raster overlaps its
// downlink raster; table order decides which entry wins.
pub const WCDMA_UARFCN: &[ChannelRange] = &[
    ChannelRange::new(10562, 10838, 2112.4, 0.2, "Band I"),
    ChannelRange::new(9662, 9938, 1932.4, 0.2, "Band II"),
    ChannelRange::new(1162, 1513, 1807.4, 0.2, "Band III"),
    ChannelRange::new(1537, 1738, 2112.4, 0.2, "Band IV"),
    ChannelRange::new(4387, 4413, 877.4, 0.2, "Band VI"),
    ChannelRange::new(4357, 4458, 871.4, 0.2, "Band V"),
    ChannelRange::new(2237, 2563, 2622.4, 0.2, "Band VII"),
    ChannelRange::new(2012, 2338, 2502.4, 0.2, "Band VII (UL)"),
    ChannelRange::new(2937, 3088, 927.4, 0.2, "Band VIII"),
    ChannelRange::new(3712, 3787, 1478.4, 0.2, "Band XI"),
    ChannelRange::new(3842, 3903, 731.4, 0.2, "Band XII"),
    ChannelRange::new(4017, 4043, 748.4, 0.2, "Band XIII"),
    ChannelRange::new(4117, 4143, 760.4, 0.2, "Band XIV"),
    ChannelRange::new(712, 763, 877.4, 0.2, "Band XIX"),
];

pub const LTE_EARFCN: &[ChannelRange] = &[
    ChannelRange::new(0, 599, 2110.0, 0.1, "Band 1"),
    ChannelRange::new(600, 1199, 1930.0, 0.1, "Band 2"),
    ChannelRange::new(1200, 1949, 1805.0, 0.1, "Band 3"),
    ChannelRange::new(1950, 2399, 2110.0, 0.1, "Band 4"),
    ChannelRange::new(2400, 2649, 869.0, 0.1, "Band 5"),
    ChannelRange::new(2750, 3449, 2620.0, 0.1, "Band 7"),
    ChannelRange::new(3450, 3799, 925.0, 0.1, "Band 8"),
];

/// Upper bound of the NR global frequency raster
pub const NR_ARFCN_MAX: i64 = 3_279_165;

/// First NR-ARFCN of frequency range 2 (mmWave)
pub const NR_FR2_START: i64 = 2_016_667;

// Flat 5 kHz raster across the whole NR-ARFCN space.
const NR_ARFCN: &[ChannelRange] = &[ChannelRange::new(0, NR_ARFCN_MAX, 0.0, 0.005, "NR")];

/// Named NR operating band by downlink NR-ARFCN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NrBand {
    pub start: i64,
    pub end: i64,
    pub label: &'static str,
}

impl NrBand {
    const fn new(start: i64, end: i64, label: &'static str) -> Self {
        Self { start, end, label }
    }

    fn contains(&self, channel: i64) -> bool {
        (self.start..=self.end).contains(&channel)
    }
}

// Narrower bands come first where allocations overlap.
pub const NR_BANDS: &[NrBand] = &[
    NrBand::new(151_600, 160_600, "n28 (700 MHz)"),
    NrBand::new(158_200, 164_200, "n20 (800 MHz)"),
    NrBand::new(173_800, 178_800, "n5 (850 MHz)"),
    NrBand::new(185_000, 192_000, "n8 (900 MHz)"),
    NrBand::new(361_000, 376_000, "n3 (1800 MHz)"),
    NrBand::new(422_000, 434_000, "n1 (2100 MHz)"),
    NrBand::new(460_000, 480_000, "n40 (2300 MHz)"),
    NrBand::new(514_000, 524_000, "n38 (2600 MHz)"),
    NrBand::new(524_000, 538_000, "n7 (2600 MHz)"),
    NrBand::new(499_200, 537_999, "n41 (2500 MHz)"),
    NrBand::new(620_000, 653_333, "n78 (3500 MHz)"),
    NrBand::new(620_000, 680_000, "n77 (3700 MHz)"),
    NrBand::new(693_334, 733_333, "n79 (4500 MHz)"),
    NrBand::new(2_016_667, 2_070_832, "n258 (26 GHz)"),
    NrBand::new(2_070_833, 2_084_999, "n261 (28 GHz)"),
    NrBand::new(2_054_166, 2_104_165, "n257 (28 GHz)"),
    NrBand::new(2_229_166, 2_279_165, "n260 (39 GHz)"),
];

/// Raw radio identifiers as reported by the telephony stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioSample {
    pub rat: Rat,
    pub channel_number: i64,
}

impl RadioSample {
    pub fn new(rat: Rat, channel_number: i64) -> Self {
        Self { rat, channel_number }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedChannel {
    #[serde(rename = "frequencyMHz")]
    pub frequency_mhz: f64,
    #[serde(rename = "bandLabel")]
    pub band_label: String,
}

impl ResolvedChannel {
    pub fn is_resolved(&self) -> bool {
        self.frequency_mhz != UNRESOLVED_FREQUENCY_MHZ
    }
}

fn find_range(rat: Rat, channel: i64) -> Option<&'static ChannelRange> {
    rat.table().iter().find(|r| r.contains(channel))
}

/// Carrier frequency in MHz, or [`UNRESOLVED_FREQUENCY_MHZ`] when the channel
/// is outside every range for `rat`.
///
/// NR uses the flat 5 kHz global raster (`n * 0.005`) with no per-range
/// offsets, so values above 3 GHz differ from the 3GPP formula.
pub fn resolve_frequency(rat: Rat, channel: i64) -> f64 {
    find_range(rat, channel)
        .map(|r| r.frequency_mhz(channel))
        .unwrap_or(UNRESOLVED_FREQUENCY_MHZ)
}

/// Band label for a channel, or [`UNKNOWN_BAND`] when nothing matches.
pub fn resolve_band(rat: Rat, channel: i64) -> String {
    let Some(range) = find_range(rat, channel) else {
        return UNKNOWN_BAND.to_string();
    };

    match rat {
        Rat::Nr => nr_band_label(channel).to_string(),
        _ => range.label.to_string(),
    }
}

fn nr_band_label(channel: i64) -> &'static str {
    match NR_BANDS.iter().find(|b| b.contains(channel)) {
        Some(band) => band.label,
        None if channel < NR_FR2_START => "FR1",
        None => "FR2",
    }
}

pub fn resolve_channel(sample: RadioSample) -> ResolvedChannel {
    ResolvedChannel {
        frequency_mhz: resolve_frequency(sample.rat, sample.channel_number),
        band_label: resolve_band(sample.rat, sample.channel_number),
    }
}
