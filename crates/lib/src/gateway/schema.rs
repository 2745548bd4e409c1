//! Response schemas handed to the generation service (Gemini `responseSchema` dialect).
//!
//! Field names here are the wire names the validation boundary in `validate.rs` reads back.

use serde_json::{json, Value};

/// Schema for the seven-facet bill analysis.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "simplifiedExplanation": {
                "type": "STRING",
                "description": "A very simple, easy-to-understand explanation of the bill, suitable for a 10th-grade student."
            },
            "viewpoints": {
                "type": "OBJECT",
                "description": "Three distinct viewpoints on the bill: one strongly in favor (pro), one strongly against (con), and one neutral.",
                "properties": {
                    "pro": { "type": "STRING", "description": "A strong argument in favor of the bill." },
                    "con": { "type": "STRING", "description": "A strong argument against the bill." },
                    "neutral": { "type": "STRING", "description": "A balanced, neutral analysis of the bill's implications." }
                },
                "required": ["pro", "con", "neutral"]
            },
            "impactData": {
                "type": "ARRAY",
                "description": "3-5 data points showing the potential impact of the bill on different sectors (e.g. Economy, Environment, Social).",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Name of the sector or area of impact." },
                        "ifPassed": { "type": "NUMBER", "description": "Score from -100 to 100 for the impact if the bill is passed." },
                        "ifNotPassed": { "type": "NUMBER", "description": "Score from -100 to 100 for the impact if the bill is not passed." }
                    },
                    "required": ["name", "ifPassed", "ifNotPassed"]
                }
            },
            "parliamentaryDebate": {
                "type": "ARRAY",
                "description": "A summary of real parliamentary debates on this bill, citing 3-4 key speakers if possible.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "speaker": { "type": "STRING", "description": "Name of the speaker (e.g. 'Hon. Member A')." },
                        "party": { "type": "STRING", "description": "Party of the speaker (e.g. 'Ruling Party', 'Opposition')." },
                        "statement": { "type": "STRING", "description": "A key quote or summary of their argument, based on real debates." }
                    },
                    "required": ["speaker", "party", "statement"]
                }
            },
            "media": {
                "type": "ARRAY",
                "description": "3-5 real media items (videos, news articles) related to the bill. Provide real, verifiable URLs for news articles.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": { "type": "STRING", "enum": ["Video", "Audio", "News"], "description": "Type of media." },
                        "title": { "type": "STRING", "description": "Title of the media item." },
                        "description": { "type": "STRING", "description": "A brief, one-sentence description." },
                        "uri": { "type": "STRING", "description": "A real, verifiable news source URL if the type is 'News'." }
                    },
                    "required": ["type", "title", "description"]
                }
            },
            "flashcards": {
                "type": "ARRAY",
                "description": "3-5 flashcards with a question and a concise answer about the bill.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING", "description": "A key question about the bill." },
                        "answer": { "type": "STRING", "description": "A clear, concise answer to the question." }
                    },
                    "required": ["question", "answer"]
                }
            },
            "mindMap": {
                "type": "OBJECT",
                "description": "A mind map structure of the bill's key components.",
                "properties": {
                    "centralTopic": { "type": "STRING", "description": "The core idea or title of the bill." },
                    "branches": {
                        "type": "ARRAY",
                        "description": "The main branches off the central topic.",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "title": { "type": "STRING", "description": "Title of the main branch." },
                                "children": {
                                    "type": "ARRAY",
                                    "description": "Sub-points for this branch.",
                                    "items": { "type": "STRING" }
                                }
                            },
                            "required": ["title"]
                        }
                    }
                },
                "required": ["centralTopic", "branches"]
            }
        },
        "required": [
            "simplifiedExplanation",
            "viewpoints",
            "impactData",
            "parliamentaryDebate",
            "media",
            "flashcards",
            "mindMap"
        ]
    })
}

/// Schema for discussion replies: an array of {name, text}.
pub fn chat_replies_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING", "description": "Name of the speaker." },
                "text": { "type": "STRING", "description": "The reply text in Hinglish." }
            },
            "required": ["name", "text"]
        }
    })
}
