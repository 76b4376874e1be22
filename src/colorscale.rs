//! Heatmap colour schemes and colour-domain derivation
//!
//! Diverging schemes get a zero-centred domain when the prices straddle
//! zero; sequential schemes are anchored at zero on whichever side the data
//! lives. Mixed-sign data under a sequential scheme simply spans min..max,
//! which is a known weak spot of those scales and left as is.

use serde::Serialize;

/// Name of the built-in green/neutral/red scheme
pub const DEFAULT_SCHEME: &str = "Custom";

/// Negative end of the default scheme
const CUSTOM_LOW: &str = "rgb(106,168,79)";
/// Colour at zero
const CUSTOM_NEUTRAL: &str = "rgb(225,237,219)";
/// Positive end of the default scheme
const CUSTOM_HIGH: &str = "rgb(204,0,0)";

/// Plotly named scales treated as zero-centred
pub const DIVERGING_SCALES: &[&str] = &["RdBu", "Picnic", "Portland", "Bluered"];

/// Plotly named scales anchored at one end
pub const SEQUENTIAL_SCALES: &[&str] = &[
    "Viridis", "Cividis", "YlOrRd", "YlGnBu", "Reds", "Blues", "Greens", "Greys", "Hot",
    "Blackbody", "Electric", "Jet", "Rainbow", "Earth",
];

/// ColorBrewer diverging scales Plotly.js does not ship by name
const BREWER_SCALES: &[(&str, &[&str])] = &[
    (
        "RdYlGn",
        &[
            "#a50026", "#d73027", "#f46d43", "#fdae61", "#fee08b", "#ffffbf", "#d9ef8b", "#a6d96a",
            "#66bd63", "#1a9850", "#006837",
        ],
    ),
    (
        "Spectral",
        &[
            "#9e0142", "#d53e4f", "#f46d43", "#fdae61", "#fee08b", "#ffffbf", "#e6f598", "#abdda4",
            "#66c2a5", "#3288bd", "#5e4fa2",
        ],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Diverging,
    Sequential,
}

#[derive(Debug, Clone, PartialEq)]
enum Palette {
    /// The default three-stop scheme, neutral pinned at zero
    Custom,
    /// Shipped by Plotly.js, referenced by name
    Named(String),
    /// Evenly spaced explicit colours
    Fixed(&'static [&'static str]),
}

/// A selected colour scheme
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScheme {
    name: String,
    kind: ScaleKind,
    palette: Palette,
}

impl ColorScheme {
    /// Resolve a scheme by name.
    ///
    /// Names outside the membership lists are passed through to the chart
    /// and use the sequential domain rules.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case(DEFAULT_SCHEME) {
            return Self {
                name: DEFAULT_SCHEME.to_string(),
                kind: ScaleKind::Diverging,
                palette: Palette::Custom,
            };
        }

        if let Some((brewer, colors)) = BREWER_SCALES.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            return Self {
                name: (*brewer).to_string(),
                kind: ScaleKind::Diverging,
                palette: Palette::Fixed(*colors),
            };
        }

        let kind = if DIVERGING_SCALES.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            ScaleKind::Diverging
        } else {
            ScaleKind::Sequential
        };

        Self { name: name.to_string(), kind, palette: Palette::Named(name.to_string()) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    /// Chart-ready colour scale for `domain`, optionally reversed
    pub fn render(&self, domain: &ColorDomain, reverse: bool) -> HeatmapColors {
        let (colorscale, reversescale) = match &self.palette {
            Palette::Custom => {
                let neutral_at = domain.zero_position();
                let (low, high) = if reverse {
                    (CUSTOM_HIGH, CUSTOM_LOW)
                } else {
                    (CUSTOM_LOW, CUSTOM_HIGH)
                };
                let stops = vec![
                    (0.0, low.to_string()),
                    (neutral_at, CUSTOM_NEUTRAL.to_string()),
                    (1.0, high.to_string()),
                ];
                (ColorscaleSpec::Stops(stops), false)
            }
            Palette::Named(name) => (ColorscaleSpec::Named(name.clone()), reverse),
            Palette::Fixed(colors) => (ColorscaleSpec::Stops(evenly_spaced(colors)), reverse),
        };

        HeatmapColors { scheme: self.name.clone(), colorscale, reversescale, domain: *domain }
    }
}

fn evenly_spaced(colors: &[&str]) -> Vec<(f64, String)> {
    let last = colors.len().saturating_sub(1).max(1) as f64;
    colors
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f64 / last, (*c).to_string()))
        .collect()
}

/// Colour scale as Plotly expects it: a name or `[position, colour]` pairs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorscaleSpec {
    Named(String),
    Stops(Vec<(f64, String)>),
}

/// Value range mapped onto the colour scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorDomain {
    pub zmin: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zmid: Option<f64>,
    pub zmax: f64,
}

impl ColorDomain {
    /// Derive the domain from the table's price range.
    ///
    /// `None` when there are no prices at all.
    pub fn derive(min_max: Option<(f64, f64)>, kind: ScaleKind) -> Option<Self> {
        let (min, max) = min_max?;

        let domain = if min >= 0.0 {
            Self { zmin: 0.0, zmid: None, zmax: max }
        } else if max <= 0.0 {
            Self { zmin: min, zmid: None, zmax: 0.0 }
        } else {
            match kind {
                ScaleKind::Diverging => {
                    let bound = min.abs().max(max.abs());
                    Self { zmin: -bound, zmid: Some(0.0), zmax: bound }
                }
                ScaleKind::Sequential => Self { zmin: min, zmid: None, zmax: max },
            }
        };

        Some(domain)
    }

    /// Where zero falls on the 0..1 colour axis
    pub fn zero_position(&self) -> f64 {
        let span = self.zmax - self.zmin;
        if span <= 0.0 {
            return if self.zmax <= 0.0 && self.zmin < 0.0 { 1.0 } else { 0.0 };
        }
        ((0.0 - self.zmin) / span).clamp(0.0, 1.0)
    }
}

/// Everything the heatmap needs to colour its cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapColors {
    pub scheme: String,
    pub colorscale: ColorscaleSpec,
    pub reversescale: bool,
    pub domain: ColorDomain,
}

/// Scheme names offered in the picker, default first
pub fn available_schemes() -> Vec<(&'static str, ScaleKind)> {
    let mut schemes = vec![(DEFAULT_SCHEME, ScaleKind::Diverging)];
    schemes.extend(BREWER_SCALES.iter().map(|(n, _)| (*n, ScaleKind::Diverging)));
    schemes.extend(DIVERGING_SCALES.iter().map(|n| (*n, ScaleKind::Diverging)));
    schemes.extend(SEQUENTIAL_SCALES.iter().map(|n| (*n, ScaleKind::Sequential)));
    schemes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(min: f64, max: f64, kind: ScaleKind) -> ColorDomain {
        ColorDomain::derive(Some((min, max)), kind).expect("domain")
    }

    #[test]
    fn test_diverging_mixed_sign_is_symmetric() {
        let d = domain(-5.0, 10.0, ScaleKind::Diverging);
        assert_eq!((d.zmin, d.zmid, d.zmax), (-10.0, Some(0.0), 10.0));

        let d = domain(-40.0, 12.5, ScaleKind::Diverging);
        assert_eq!((d.zmin, d.zmid, d.zmax), (-40.0, Some(0.0), 40.0));
    }

    #[test]
    fn test_one_signed_data_anchors_at_zero() {
        let d = domain(2.0, 10.0, ScaleKind::Diverging);
        assert_eq!((d.zmin, d.zmid, d.zmax), (0.0, None, 10.0));

        let d = domain(3.0, 10.0, ScaleKind::Sequential);
        assert_eq!((d.zmin, d.zmid, d.zmax), (0.0, None, 10.0));

        let d = domain(-8.0, -1.0, ScaleKind::Diverging);
        assert_eq!((d.zmin, d.zmid, d.zmax), (-8.0, None, 0.0));

        let d = domain(-8.0, -1.0, ScaleKind::Sequential);
        assert_eq!((d.zmin, d.zmid, d.zmax), (-8.0, None, 0.0));
    }

    #[test]
    fn test_sequential_mixed_sign_spans_data() {
        let d = domain(-5.0, 10.0, ScaleKind::Sequential);
        assert_eq!((d.zmin, d.zmid, d.zmax), (-5.0, None, 10.0));
    }

    #[test]
    fn test_no_values_no_domain() {
        assert!(ColorDomain::derive(None, ScaleKind::Diverging).is_none());
    }

    #[test]
    fn test_scheme_classification() {
        assert_eq!(ColorScheme::from_name("RdBu").kind(), ScaleKind::Diverging);
        assert_eq!(ColorScheme::from_name("viridis").kind(), ScaleKind::Sequential);
        assert_eq!(ColorScheme::from_name("Spectral").kind(), ScaleKind::Diverging);
        assert_eq!(ColorScheme::from_name("").name(), DEFAULT_SCHEME);
        assert_eq!(ColorScheme::from_name("custom").kind(), ScaleKind::Diverging);
        // Unlisted names fall back to sequential rules
        assert_eq!(ColorScheme::from_name("Tropic").kind(), ScaleKind::Sequential);
    }

    #[test]
    fn test_custom_neutral_follows_zero() {
        let scheme = ColorScheme::from_name(DEFAULT_SCHEME);

        let mixed = scheme.render(&domain(-5.0, 10.0, ScaleKind::Diverging), false);
        let ColorscaleSpec::Stops(stops) = &mixed.colorscale else {
            panic!("custom scheme renders explicit stops");
        };
        assert_eq!(stops[1], (0.5, CUSTOM_NEUTRAL.to_string()));
        assert_eq!(stops[0].1, CUSTOM_LOW);

        let positive = scheme.render(&domain(2.0, 10.0, ScaleKind::Diverging), false);
        let ColorscaleSpec::Stops(stops) = &positive.colorscale else {
            panic!("custom scheme renders explicit stops");
        };
        assert_eq!(stops[1].0, 0.0);

        let negative = scheme.render(&domain(-9.0, -2.0, ScaleKind::Diverging), false);
        let ColorscaleSpec::Stops(stops) = &negative.colorscale else {
            panic!("custom scheme renders explicit stops");
        };
        assert_eq!(stops[1].0, 1.0);
    }

    #[test]
    fn test_reverse() {
        let d = domain(-5.0, 10.0, ScaleKind::Diverging);

        let custom = ColorScheme::from_name(DEFAULT_SCHEME).render(&d, true);
        assert!(!custom.reversescale);
        let ColorscaleSpec::Stops(stops) = &custom.colorscale else {
            panic!("custom scheme renders explicit stops");
        };
        assert_eq!(stops[0].1, CUSTOM_HIGH);
        assert_eq!(stops[2].1, CUSTOM_LOW);
        assert_eq!(stops[1].0, 0.5);

        let named = ColorScheme::from_name("RdBu").render(&d, true);
        assert!(named.reversescale);
        assert_eq!(named.colorscale, ColorscaleSpec::Named("RdBu".to_string()));
    }

    #[test]
    fn test_brewer_scale_stops() {
        let d = domain(1.0, 2.0, ScaleKind::Diverging);
        let colors = ColorScheme::from_name("rdylgn").render(&d, false);
        let ColorscaleSpec::Stops(stops) = &colors.colorscale else {
            panic!("brewer scale renders explicit stops");
        };
        assert_eq!(stops.len(), 11);
        assert_eq!(stops[0].0, 0.0);
        assert_eq!(stops[10].0, 1.0);
        assert_eq!(colors.scheme, "RdYlGn");
    }

    #[test]
    fn test_domain_serialization_omits_missing_mid() {
        let json = serde_json::to_string(&domain(3.0, 10.0, ScaleKind::Sequential)).expect("serialize");
        assert_eq!(json, r#"{"zmin":0.0,"zmax":10.0}"#);
    }

    #[test]
    fn test_available_schemes_default_first() {
        let schemes = available_schemes();
        assert_eq!(schemes[0], (DEFAULT_SCHEME, ScaleKind::Diverging));
        assert!(schemes.iter().any(|(n, k)| *n == "Viridis" && *k == ScaleKind::Sequential));
    }
}
