/// Blend factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFunc {
    Zero,
    One,
    SrcColor,
    DstColor,
    OneMinusSrc,
    OneMinusDst,
    SrcAlpha,
    DstAlpha,
    OneMinusSrcAlpha,
    OneMinusDstAlpha,
}

/// Blend equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendEq {
    Add,
    Subtract,
    ReverseSubtract,
}

/// Named blend configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendPreset {
    Normal,
    PremultipliedAlpha,
    Multiply,
    Add,
    Subtract,
    ModAlpha,
    SetAlpha,
    Set,
    NormalKeepAlpha,
    NormalAddAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendMode {
    pub source_color: BlendFunc,
    pub dest_color: BlendFunc,
    pub source_alpha: BlendFunc,
    pub dest_alpha: BlendFunc,
    pub color_equation: BlendEq,
    pub alpha_equation: BlendEq,
}

impl Default for BlendMode {
    fn default() -> Self {
        BlendMode::from_preset(BlendPreset::Normal)
    }
}

impl BlendMode {
    pub fn new(
        source_color: BlendFunc,
        dest_color: BlendFunc,
        source_alpha: BlendFunc,
        dest_alpha: BlendFunc,
        color_equation: BlendEq,
        alpha_equation: BlendEq,
    ) -> Self {
        BlendMode {
            source_color,
            dest_color,
            source_alpha,
            dest_alpha,
            color_equation,
            alpha_equation,
        }
    }

    pub fn from_preset(preset: BlendPreset) -> Self {
        use self::BlendEq as E;
        use self::BlendFunc as F;

        match preset {
            BlendPreset::Normal => BlendMode::new(
                F::SrcAlpha,
                F::OneMinusSrcAlpha,
                F::SrcAlpha,
                F::OneMinusSrcAlpha,
                E::Add,
                E::Add,
            ),
            BlendPreset::PremultipliedAlpha => BlendMode::new(
                F::One,
                F::OneMinusSrcAlpha,
                F::One,
                F::OneMinusSrcAlpha,
                E::Add,
                E::Add,
            ),
            BlendPreset::Multiply => BlendMode::new(
                F::DstColor,
                F::Zero,
                F::SrcAlpha,
                F::OneMinusSrcAlpha,
                E::Add,
                E::Add,
            ),
            BlendPreset::Add => {
                BlendMode::new(F::SrcAlpha, F::One, F::SrcAlpha, F::One, E::Add, E::Add)
            }
            BlendPreset::Subtract => BlendMode::new(
                F::One,
                F::One,
                F::One,
                F::One,
                E::Subtract,
                E::Subtract,
            ),
            // Leaves colors alone and multiplies the destination alpha by the source alpha.
            BlendPreset::ModAlpha => {
                BlendMode::new(F::Zero, F::One, F::Zero, F::SrcAlpha, E::Add, E::Add)
            }
            // Leaves colors alone and replaces the destination alpha.
            BlendPreset::SetAlpha => {
                BlendMode::new(F::Zero, F::One, F::One, F::Zero, E::Add, E::Add)
            }
            BlendPreset::Set => BlendMode::new(F::One, F::Zero, F::One, F::Zero, E::Add, E::Add),
            BlendPreset::NormalKeepAlpha => BlendMode::new(
                F::SrcAlpha,
                F::OneMinusSrcAlpha,
                F::Zero,
                F::One,
                E::Add,
                E::Add,
            ),
            BlendPreset::NormalAddAlpha => BlendMode::new(
                F::SrcAlpha,
                F::OneMinusSrcAlpha,
                F::One,
                F::One,
                E::Add,
                E::Add,
            ),
        }
    }
}

impl From<BlendPreset> for BlendMode {
    fn from(preset: BlendPreset) -> Self {
        BlendMode::from_preset(preset)
    }
}
