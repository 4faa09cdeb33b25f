//! Render a stored status reply to HTML without talking to the API.
//!
//! ```sh
//! cargo run --example render_results > report.html
//! ```

use serde_json::json;
use voice2action_client::render::render_page;
use voice2action_client::results::normalize;

fn main() {
    // Shaped like a completed /api/jobs/{id} reply
    let payload = json!({
        "job_id": "3f2a9c1e-77aa-4d1b-9c0e-5b1f6f0e2d11",
        "status": "completed",
        "transcript": "Okay, let's go over the release plan...",
        "analysis": {
            "summary": "Release moved to Friday; QA owns the checklist.",
            "tasks": [
                {"task": "Update release checklist", "assigned_to": "QA", "due_date": "Thursday"},
                "Announce new date in #general"
            ],
            "key_points": ["Blocking bug fixed", "Docs still pending"],
            "decisions": ["Ship on Friday"],
            "doc_url": "https://docs.google.com/document/d/example"
        }
    });

    let results = normalize(&payload, 500);
    print!("{}", render_page("3f2a9c1e", &results));
}
