use crate::dsp::envelope::Adsr;
use crate::dsp::oscillator::Waveform;

/// A named front-panel sound: waveform plus envelope shape. Selecting a patch
/// sets both; the waveform selector can still override the wave afterwards.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct Patch {
    pub name: &'static str,
    pub waveform: Waveform,
    pub adsr: Adsr,
}

impl Patch {
    const fn new(name: &'static str, waveform: Waveform, adsr: Adsr) -> Self {
        Self {
            name,
            waveform,
            adsr,
        }
    }
}

/// Built-in patches. "Organ" carries the instrument's historical default
/// envelope (instant on, sustained full, one second tail).
pub const PATCHES: [Patch; 5] = [
    Patch::new(
        "Organ",
        Waveform::Sine,
        Adsr {
            attack: 0.0,
            decay: 1.0,
            sustain: 1.0,
            release: 1.0,
        },
    ),
    Patch::new(
        "Keys",
        Waveform::Triangle,
        Adsr {
            attack: 0.01,
            decay: 0.3,
            sustain: 0.7,
            release: 0.4,
        },
    ),
    Patch::new(
        "Pluck",
        Waveform::Sawtooth,
        Adsr {
            attack: 0.005,
            decay: 0.2,
            sustain: 0.0,
            release: 0.15,
        },
    ),
    Patch::new(
        "Pad",
        Waveform::Sawtooth,
        Adsr {
            attack: 0.4,
            decay: 0.3,
            sustain: 0.8,
            release: 1.2,
        },
    ),
    Patch::new(
        "Chip",
        Waveform::Square,
        Adsr {
            attack: 0.002,
            decay: 0.1,
            sustain: 0.6,
            release: 0.1,
        },
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_envelopes_are_sane() {
        for patch in PATCHES {
            assert!(patch.adsr.attack >= 0.0, "{}", patch.name);
            assert!(patch.adsr.decay > 0.0, "{}", patch.name);
            assert!((0.0..=1.0).contains(&patch.adsr.sustain), "{}", patch.name);
            assert!(patch.adsr.release > 0.0, "{}", patch.name);
        }
    }

    #[test]
    fn default_patch_is_the_organ() {
        assert_eq!(PATCHES[0].name, "Organ");
        assert_eq!(PATCHES[0].adsr.attack, 0.0);
        assert_eq!(PATCHES[0].adsr.sustain, 1.0);
    }
}
