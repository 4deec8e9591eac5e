//! Built-in note templates. Placeholders use `{name}`; `{{` and `}}` are literal braces.

pub struct BuiltinTemplate {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub body: &'static str,
}

pub const BUILTIN_TEMPLATES: &[BuiltinTemplate] = &[
    BuiltinTemplate {
        name: "research",
        category: "academic",
        description: "Academic research note with methodology, findings, and next steps",
        body: r#"# {title}

## Research Context
- **Project**: {project}
- **Research Question**: {research_question}
- **Hypothesis**: {hypothesis}
- **Date**: {date}
- **Status**: {status}

## Key Findings & Insights
{content}

## Methodology
- **Approach**: {methodology}
- **Tools Used**: {tools}
- **Data Sources**: {data_sources}

## Next Steps
- [ ] Validate findings with larger dataset
- [ ] Peer review and feedback
- [ ] Plan follow-up experiments

## Related Work
{backlinks}

---
**Tags**: {tags} #research
**Confidence Level**: {confidence}/10"#,
    },
    BuiltinTemplate {
        name: "meeting-notes",
        category: "productivity",
        description: "Meeting documentation with decisions and action items",
        body: r#"# {title}

## Meeting Details
- **Date**: {date} {time}
- **Project**: {project}
- **Attendees**: {attendees}

## Agenda
{agenda}

## Discussion
{content}

## Decisions
{decisions}

## Action Items
- [ ] {action_item}

## Related Notes
{backlinks}

---
**Tags**: {tags} #meeting"#,
    },
    BuiltinTemplate {
        name: "daily-note",
        category: "productivity",
        description: "Daily productivity note with schedule, tasks, and reflections",
        body: r#"# {date}

## Main Priority
{main_priority}

## Energy Level: {energy_level}/10

## Tasks
- [ ] {main_priority}

## Notes
{content}

## Reflection
- **What went well**:
- **What to improve**:

---
**Tags**: {tags} #daily-note"#,
    },
    BuiltinTemplate {
        name: "weekly-review",
        category: "productivity",
        description: "Weekly review with goal progress and planning",
        body: r#"# Weekly Review {week}

## Theme
{weekly_theme}

## Wins
{content}

## Lessons Learned
-

## Next Week
- [ ] Define top three priorities

**Week Rating**: {week_rating}/10

---
**Tags**: {tags} #weekly-review"#,
    },
    BuiltinTemplate {
        name: "project-brief",
        category: "project",
        description: "Comprehensive project brief with scope, timeline, and resources",
        body: r#"# {title}

## Overview
- **Project**: {project}
- **Owner**: {owner}
- **Priority**: {priority}
- **Status**: {status}
- **Start Date**: {date}

## Objective
{objective}

## Scope
{content}

## Timeline
| Phase | Duration |
|-------|----------|
| Discovery | {phase1_timeline} |
| Build | {phase2_timeline} |
| Launch | {phase3_timeline} |

## Risks
- **Risk Level**: {risk_level}

## Related Notes
{backlinks}

---
**Tags**: {tags} #project"#,
    },
    BuiltinTemplate {
        name: "book-notes",
        category: "learning",
        description: "Book summary with key concepts and actionable insights",
        body: r#"# {title}

## Book Details
- **Author**: {author}
- **Started**: {date}
- **Rating**: {rating}/10

## Summary
{content}

## Key Concepts
-

## Actionable Insights
- [ ] Apply one idea this week

## Related Notes
{backlinks}

---
**Tags**: {tags} #book-notes"#,
    },
    BuiltinTemplate {
        name: "troubleshooting",
        category: "technical",
        description: "Systematic troubleshooting documentation with root cause analysis",
        body: r#"# {title}

## Problem
- **System**: {project}
- **Environment**: {environment}
- **Reported**: {date}
- **Severity**: {priority}

## Symptoms
{content}

## Investigation
```{code_language}
{code_snippets}
```

## Root Cause
{root_cause}

## Resolution
{solution}

## Prevention
- [ ] Add monitoring for this failure mode

---
**Tags**: {tags} #troubleshooting"#,
    },
];

/// Default values for placeholders that callers commonly leave unset
pub const STATIC_DEFAULTS: &[(&str, &str)] = &[
    ("title", "Untitled"),
    ("project", "General"),
    ("content", ""),
    ("tags", ""),
    ("backlinks", ""),
    ("status", "Draft"),
    ("priority", "Medium"),
    ("research_question", ""),
    ("hypothesis", ""),
    ("methodology", ""),
    ("tools", ""),
    ("data_sources", ""),
    ("confidence", "7"),
    ("attendees", ""),
    ("agenda", ""),
    ("decisions", ""),
    ("action_item", ""),
    ("main_priority", "Focus for today"),
    ("energy_level", "7"),
    ("weekly_theme", "Focus theme"),
    ("week_rating", "8"),
    ("owner", ""),
    ("objective", ""),
    ("phase1_timeline", "2 weeks"),
    ("phase2_timeline", "4 weeks"),
    ("phase3_timeline", "2 weeks"),
    ("risk_level", "Medium"),
    ("author", ""),
    ("rating", "8"),
    ("environment", ""),
    ("code_language", ""),
    ("code_snippets", ""),
    ("root_cause", ""),
    ("solution", ""),
];
