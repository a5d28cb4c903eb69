use proptest::prelude::*;

use floating_player::{
    BackendKind, Config, PlayerPosition, PlayerPreferences, SessionState, VideoRef, Viewport,
};

#[derive(Debug, Clone)]
enum Op {
    Move(f64, f64),
    Resize(f64, f64),
    ToggleMinimize,
    Play(u8),
    Pause,
    Resume,
    Close,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-5000.0f64..5000.0, -5000.0f64..5000.0).prop_map(|(x, y)| Op::Move(x, y)),
        (100.0f64..3000.0, 100.0f64..2000.0).prop_map(|(w, h)| Op::Resize(w, h)),
        Just(Op::ToggleMinimize),
        (0u8..3).prop_map(Op::Play),
        Just(Op::Pause),
        Just(Op::Resume),
        Just(Op::Close),
    ]
}

proptest! {
    #[test]
    fn window_always_inside_viewport(ops in proptest::collection::vec(op(), 1..60)) {
        let config = Config::default();
        let mut s = SessionState::new(PlayerPreferences::default(), Viewport::default(), &config);
        for op in ops {
            match op {
                Op::Move(x, y) => s.update_position(PlayerPosition::new(x, y)),
                Op::Resize(w, h) => s.set_viewport(Viewport::new(w, h)),
                Op::ToggleMinimize => s.toggle_minimize(),
                Op::Play(n) => {
                    s.play_video(VideoRef::new(
                        format!("v{n}"),
                        "t",
                        BackendKind::StreamEmbed,
                        "chan",
                        "thumb",
                    ));
                }
                Op::Pause => {
                    s.pause_video();
                }
                Op::Resume => {
                    s.resume_video();
                }
                Op::Close => {
                    s.close_player();
                }
            }

            prop_assert!(s.viewport.contains(s.position, s.window_size()));
            if s.is_playing {
                prop_assert!(s.current_video.is_some());
                prop_assert!(s.show_player);
            }
        }
    }

    #[test]
    fn clamp_is_idempotent(
        x in proptest::num::f64::ANY,
        y in proptest::num::f64::ANY,
        w in 0.0f64..4000.0,
        h in 0.0f64..4000.0,
    ) {
        let viewport = Viewport::new(w, h);
        let size = Config::default().mini_size;
        let once = viewport.clamp(PlayerPosition::new(x, y), size);
        prop_assert!(viewport.contains(once, size));
        prop_assert_eq!(viewport.clamp(once, size), once);
    }
}
