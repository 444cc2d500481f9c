//! Drive a planner-backed agent for a few simulated seconds and print the
//! resulting pose stream.
//!
//! Run with `cargo run -p em-agent --example idle`.

use em_agent::{Agent, Mood};

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let mut agent = Agent::new().with_planner(42);
    agent.set_mood(Mood::Listening);

    agent
        .submit_bml(
            r#"{"face": {"start": 0.5, "end": 2.5, "lexeme": "LIP_CORNER_PULLER", "amount": 0.6},
                "head": {"start": 0.5, "end": 2.0, "rotation": [0.1, 0.0, 0.0]}}"#,
            0.0,
        )
        .expect("well-formed block");

    // 30 fps for 6 simulated seconds.
    for frame in 0..180 {
        let now = frame as f64 / 30.0;
        let pose = agent.update(now);
        if frame % 15 == 0 {
            println!(
                "t={now:4.1}s blink={:.2} gaze=({:+.2},{:+.2}) head=({:+.2},{:+.2},{:+.2}) smile={:.2}",
                pose.blink, pose.gaze[0], pose.gaze[1], pose.head[0], pose.head[1], pose.head[2],
                pose.face[4],
            );
        }
    }
}
