use coursegen_client::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ClientError> {
    coursegen_client::observability::init_observability();

    let client = OutlineClient::from_env()?;
    let request = GenerateRequest {
        course_name: "Intro to Fractions".into(),
        grade_level: "3".into(),
        subject: "Math".into(),
        topic: "Fractions".into(),
        time_duration: "2 hours".into(),
        teacher_id: "example-teacher".into(),
        num_worksheets: 2,
        num_activities: 1,
        ..GenerateRequest::default()
    };

    let mut run = client.generate(request).start_stream().await?;
    while let Some(event) = run.next_event().await {
        match event {
            SessionEvent::Progress {
                message, percent, ..
            } => println!("[{percent:>3}%] {message}"),
            SessionEvent::Completed { .. } => println!("done"),
            SessionEvent::Error { error, .. } => eprintln!("session error: {error}"),
            SessionEvent::Started { .. } => {}
        }
    }

    let result = run.finish().await?;
    println!(
        "curriculum {} with {} sections ({} min total)",
        result.curriculum_id,
        result.outline.sections.len(),
        result.outline.total_duration_minutes()
    );
    Ok(())
}
