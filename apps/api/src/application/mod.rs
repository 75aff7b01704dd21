pub mod analyze_handstand;
