use super::entity::FormQuality;

const BANANA_BACK_ADVICE: &str = "Engage your core and tuck your ribs toward your hips. \
    Squeeze your glutes, tilt the pelvis back under you and push tall through the shoulders \
    until your hips stack directly over your hands. Hollow-body holds on the floor build the \
    same shape.";

const GOOD_FORM_ADVICE: &str = "Nice line! Wrists, shoulders, hips and ankles are stacked. \
    Keep pressing the floor away, point through the toes and work on holding this shape for \
    longer sets.";

const UNCLEAR_ADVICE: &str = "The coach could not judge this photo. Retake it side-on with \
    your whole body in frame, a plain background and good lighting, then upload it again.";

/// Coaching text for a verdict. Always non-empty.
pub fn advice_for(quality: FormQuality) -> &'static str {
    match quality {
        FormQuality::BananaBack => BANANA_BACK_ADVICE,
        FormQuality::Good => GOOD_FORM_ADVICE,
        FormQuality::Unclear => UNCLEAR_ADVICE,
    }
}
