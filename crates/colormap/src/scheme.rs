//! Color schemes and multi-stop interpolation.

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Available color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    /// Dark blue -> Cyan -> Yellow -> Dark red (temperature maps)
    #[default]
    Jet,
    /// Pale yellow -> Orange -> Dark brown (error magnitudes)
    Heat,
    /// Blue -> White -> Red (signed differences)
    BlueWhiteRed,
    /// Black -> White
    Grayscale,
}

impl ColorScheme {
    /// All available schemes
    pub const ALL: &'static [ColorScheme] = &[
        Self::Jet,
        Self::Heat,
        Self::BlueWhiteRed,
        Self::Grayscale,
    ];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Jet => "jet",
            Self::Heat => "heat",
            Self::BlueWhiteRed => "blue-white-red",
            Self::Grayscale => "grayscale",
        }
    }

    /// Look a scheme up by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

const JET_STOPS: &[ColorStop] = &[
    ColorStop::new(0.000, 0, 0, 128),
    ColorStop::new(0.125, 0, 0, 255),
    ColorStop::new(0.375, 0, 255, 255),
    ColorStop::new(0.625, 255, 255, 0),
    ColorStop::new(0.875, 255, 0, 0),
    ColorStop::new(1.000, 128, 0, 0),
];

const HEAT_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 255, 255, 212),
    ColorStop::new(0.25, 254, 217, 142),
    ColorStop::new(0.50, 254, 153, 41),
    ColorStop::new(0.75, 204, 76, 2),
    ColorStop::new(1.00, 102, 37, 6),
];

const BLUE_WHITE_RED_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 33, 102, 172),
    ColorStop::new(0.25, 103, 169, 207),
    ColorStop::new(0.50, 247, 247, 247),
    ColorStop::new(0.75, 239, 138, 98),
    ColorStop::new(1.00, 178, 24, 43),
];

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    let channel = |a: u8, b: u8| lerp(a as f64, b as f64, t).round() as u8;
    Rgb::new(channel(c1.r, c2.r), channel(c1.g, c2.g), channel(c1.b, c2.b))
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    let first = stops[0];
    let last = stops[stops.len() - 1];
    if t.is_nan() || t <= first.t {
        return first.color;
    }
    if t >= last.t {
        return last.color;
    }
    stops
        .windows(2)
        .find(|pair| t <= pair[1].t)
        .map(|pair| {
            let ratio = (t - pair[0].t) / (pair[1].t - pair[0].t);
            lerp_color(pair[0].color, pair[1].color, ratio)
        })
        .unwrap_or(last.color)
}

/// Evaluate a color scheme at normalized position `t` ∈ [0, 1].
///
/// Values outside the interval are clamped to the end colors.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::Jet => multi_stop(JET_STOPS, t),
        ColorScheme::Heat => multi_stop(HEAT_STOPS, t),
        ColorScheme::BlueWhiteRed => multi_stop(BLUE_WHITE_RED_STOPS, t),
        ColorScheme::Grayscale => {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
    }
}
