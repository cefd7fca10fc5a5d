//! Roadmap prompt construction.

use skillforge_core::{MAX_TASK_XP, MIN_TASK_XP};

/// Build the generation prompt for `skill` over `duration`.
///
/// Asks for 5 to 7 tasks across the four categories, each with title,
/// description, XP reward, estimated time and category, as a bare JSON array.
pub fn build_roadmap_prompt(skill: &str, duration: &str) -> String {
    format!(
        r#"Generate a detailed learning roadmap for "{skill}" over a period of "{duration}".
The roadmap should consist of 5-7 distinct tasks divided into these categories: Foundation, Implementation, Advanced, and Mastery.
For each task, provide:
- a concise title (e.g., "Understand the Basics", "Set up a Development Environment")
- a detailed description of what needs to be learned or done for this task
- an estimated XP value (between {min_xp} and {max_xp}, based on complexity)
- an estimated time to complete (e.g., "2-3 hours", "1 day", "3 days")
- a category (one of: "Foundation", "Implementation", "Advanced", "Mastery")

The output must be a JSON array of task objects, formatted exactly as follows:
[
  {{
    "title": "Task Title 1",
    "description": "Detailed description of task 1.",
    "xp": 100,
    "estimatedTime": "2 days",
    "category": "Foundation"
  }},
  {{
    "title": "Task Title 2",
    "description": "Detailed description of task 2.",
    "xp": 150,
    "estimatedTime": "1 week",
    "category": "Implementation"
  }}
]

Additional guidelines:
1. Start with 1-2 Foundation tasks (basic concepts and setup)
2. Include 2-3 Implementation tasks (practical applications)
3. Include 1-2 Advanced tasks (complex topics)
4. Optionally include 1 Mastery task (expert-level challenge)
5. Progress difficulty logically through the categories
6. Respond with valid JSON and nothing else."#,
        skill = skill,
        duration = duration,
        min_xp = MIN_TASK_XP,
        max_xp = MAX_TASK_XP,
    )
}
