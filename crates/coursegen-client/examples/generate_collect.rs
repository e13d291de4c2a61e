use coursegen_client::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ClientError> {
    coursegen_client::observability::init_observability();

    let client = OutlineClient::from_env()?;
    let request = GenerateRequest {
        course_name: "The Montgomery Bus Boycott".into(),
        grade_level: "5".into(),
        subject: "Social Studies".into(),
        topic: "Civil rights movement".into(),
        time_duration: "1 week".into(),
        objectives: "Understand how the boycott was organized and why it succeeded".into(),
        teacher_id: "example-teacher".into(),
        num_worksheets: 3,
        num_activities: 2,
    };

    let result = client.generate(request).collect().await?;
    for section in &result.outline.sections {
        println!("{}: {}", section.id, section.title);
        for sub in &section.subsections {
            println!("  - {} ({} min)", sub.title, sub.duration_minutes);
        }
    }
    Ok(())
}
