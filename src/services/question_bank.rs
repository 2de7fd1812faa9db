use crate::models::question::{
    AnswerOption, Difficulty, Question, QuestionDetails, QuestionKind,
};
use rand::seq::SliceRandom;

/// Curated question banks keyed by detected course topic. Used whenever the
/// generative service is absent or fails, so quiz generation never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    React,
    JavaScript,
    Python,
    DataStructures,
    Web,
    General,
}

/// Case-insensitive keyword match against course title + category.
/// React is checked before the broader JavaScript keywords so "Intro to
/// React" lands in the react bank.
pub fn detect_topic(title: &str, category: Option<&str>) -> Topic {
    let haystack = format!("{} {}", title, category.unwrap_or("")).to_lowercase();

    let matches = |keywords: &[&str]| keywords.iter().any(|k| haystack.contains(k));

    if matches(&["react"]) {
        Topic::React
    } else if matches(&["javascript", "node", "typescript", " js", "js "]) {
        Topic::JavaScript
    } else if matches(&["python", "django", "flask"]) {
        Topic::Python
    } else if matches(&["data structure", "algorithm"]) {
        Topic::DataStructures
    } else if matches(&["web", "html", "css"]) {
        Topic::Web
    } else {
        Topic::General
    }
}

/// Shuffle the matched bank and return the first `min(count, bank len)`.
pub fn fallback_questions(title: &str, category: Option<&str>, count: usize) -> Vec<Question> {
    let topic = detect_topic(title, category);
    tracing::debug!(?topic, title, "Selecting fallback question bank");

    let mut bank = bank_for(topic);
    bank.shuffle(&mut rand::thread_rng());
    bank.truncate(count);
    for (idx, q) in bank.iter_mut().enumerate() {
        q.id = (idx as i32) + 1;
    }
    bank
}

pub fn bank_for(topic: Topic) -> Vec<Question> {
    match topic {
        Topic::React => react_bank(),
        Topic::JavaScript => javascript_bank(),
        Topic::Python => python_bank(),
        Topic::DataStructures => data_structures_bank(),
        Topic::Web => web_bank(),
        Topic::General => general_bank(),
    }
}

fn mc(prompt: &str, options: &[(&str, bool)], difficulty: Difficulty, explanation: &str) -> Question {
    Question {
        id: 0,
        kind: QuestionKind::MultipleChoice,
        prompt: prompt.to_string(),
        description: None,
        points: 1.0,
        explanation: Some(explanation.to_string()),
        difficulty,
        details: QuestionDetails::Choice {
            options: options
                .iter()
                .map(|(text, is_correct)| AnswerOption {
                    text: text.to_string(),
                    is_correct: *is_correct,
                })
                .collect(),
        },
    }
}

fn tf(prompt: &str, answer: bool, difficulty: Difficulty, explanation: &str) -> Question {
    Question {
        id: 0,
        kind: QuestionKind::TrueFalse,
        prompt: prompt.to_string(),
        description: None,
        points: 1.0,
        explanation: Some(explanation.to_string()),
        difficulty,
        details: QuestionDetails::Choice {
            options: vec![
                AnswerOption {
                    text: "True".to_string(),
                    is_correct: answer,
                },
                AnswerOption {
                    text: "False".to_string(),
                    is_correct: !answer,
                },
            ],
        },
    }
}

fn sa(prompt: &str, correct_answer: &str, difficulty: Difficulty) -> Question {
    Question {
        id: 0,
        kind: QuestionKind::ShortAnswer,
        prompt: prompt.to_string(),
        description: None,
        points: 1.0,
        explanation: None,
        difficulty,
        details: QuestionDetails::FreeText {
            correct_answer: correct_answer.to_string(),
        },
    }
}

fn react_bank() -> Vec<Question> {
    vec![
        mc(
            "Which hook is used to add local state to a function component?",
            &[("useEffect", false), ("useState", true), ("useContext", false), ("useRef", false)],
            Difficulty::Easy,
            "useState returns a stateful value and a setter function.",
        ),
        mc(
            "What does JSX compile down to?",
            &[
                ("HTML strings", false),
                ("React.createElement calls", true),
                ("Template literals", false),
                ("Web Components", false),
            ],
            Difficulty::Medium,
            "JSX is syntactic sugar for React.createElement(component, props, children).",
        ),
        mc(
            "Which prop must be provided when rendering a list of elements?",
            &[("id", false), ("ref", false), ("key", true), ("index", false)],
            Difficulty::Easy,
            "Keys help React identify which items have changed between renders.",
        ),
        mc(
            "When does useEffect with an empty dependency array run?",
            &[
                ("On every render", false),
                ("Only after the first render", true),
                ("Before every render", false),
                ("Never", false),
            ],
            Difficulty::Medium,
            "An empty dependency array means the effect has no reactive inputs.",
        ),
        mc(
            "What is the purpose of React's virtual DOM?",
            &[
                ("It replaces the browser DOM entirely", false),
                ("It minimizes direct DOM mutations by diffing render output", true),
                ("It caches HTTP responses", false),
                ("It stores component state between sessions", false),
            ],
            Difficulty::Hard,
            "React diffs the virtual tree and applies the minimal set of real DOM updates.",
        ),
        tf(
            "Props in React are read-only within the receiving component.",
            true,
            Difficulty::Easy,
            "A component must never modify its own props; data flows down.",
        ),
        tf(
            "Calling a state setter from useState merges object state automatically like this.setState.",
            false,
            Difficulty::Hard,
            "Unlike class setState, the useState setter replaces the value; merging is manual.",
        ),
        sa(
            "Which hook would you use to memoize an expensive computed value between renders?",
            "useMemo",
            Difficulty::Medium,
        ),
        sa(
            "What is the term for passing data from a parent component to a child component?",
            "props",
            Difficulty::Easy,
        ),
        sa(
            "Which technique shares stateful logic by lifting it into a reusable function whose name starts with 'use'?",
            "custom hook",
            Difficulty::Medium,
        ),
    ]
}

fn javascript_bank() -> Vec<Question> {
    vec![
        mc(
            "Which keyword declares a block-scoped variable that cannot be reassigned?",
            &[("var", false), ("let", false), ("const", true), ("static", false)],
            Difficulty::Easy,
            "const bindings are block-scoped and must be initialized once.",
        ),
        mc(
            "What does 'typeof null' evaluate to?",
            &[("'null'", false), ("'undefined'", false), ("'object'", true), ("'number'", false)],
            Difficulty::Medium,
            "A long-standing quirk: null is reported as 'object'.",
        ),
        mc(
            "Which method creates a new array with the results of calling a function on every element?",
            &[("forEach", false), ("map", true), ("filter", false), ("reduce", false)],
            Difficulty::Easy,
            "map transforms each element and returns a new array of the same length.",
        ),
        mc(
            "What is the output order of: console.log(1); setTimeout(() => console.log(2), 0); Promise.resolve().then(() => console.log(3));",
            &[("1, 2, 3", false), ("1, 3, 2", true), ("3, 1, 2", false), ("2, 3, 1", false)],
            Difficulty::Hard,
            "Microtasks (promises) run before macrotasks (timers) after synchronous code.",
        ),
        mc(
            "Which comparison operator checks equality without type coercion?",
            &[("==", false), ("===", true), ("=", false), ("!=", false)],
            Difficulty::Easy,
            "Strict equality compares both value and type.",
        ),
        tf(
            "JavaScript is a single-threaded language with an event loop for asynchronous work.",
            true,
            Difficulty::Medium,
            "Concurrency is cooperative: callbacks are queued and run on one thread.",
        ),
        tf(
            "Arrow functions have their own 'this' binding.",
            false,
            Difficulty::Medium,
            "Arrow functions capture 'this' lexically from the enclosing scope.",
        ),
        sa(
            "What is the name for a function bundled together with references to its surrounding lexical scope?",
            "closure",
            Difficulty::Medium,
        ),
        sa(
            "Which built-in object is used to work with asynchronous operations and has .then and .catch methods?",
            "Promise",
            Difficulty::Easy,
        ),
        sa(
            "What mechanism moves function and variable declarations to the top of their scope before execution?",
            "hoisting",
            Difficulty::Hard,
        ),
    ]
}

fn python_bank() -> Vec<Question> {
    vec![
        mc(
            "Which data structure is ordered, mutable, and allows duplicate elements?",
            &[("tuple", false), ("set", false), ("list", true), ("frozenset", false)],
            Difficulty::Easy,
            "Lists are Python's ordered mutable sequence type.",
        ),
        mc(
            "What does the expression [x * 2 for x in range(3)] produce?",
            &[("[0, 2, 4]", true), ("[2, 4, 6]", false), ("[0, 1, 2]", false), ("[1, 2, 3]", false)],
            Difficulty::Medium,
            "range(3) yields 0, 1, 2, each doubled by the comprehension.",
        ),
        mc(
            "Which keyword defines an anonymous inline function?",
            &[("def", false), ("func", false), ("lambda", true), ("fn", false)],
            Difficulty::Easy,
            "lambda creates a single-expression anonymous function.",
        ),
        mc(
            "What is the correct way to open a file that guarantees it is closed afterwards?",
            &[
                ("f = open(path); f.close()", false),
                ("with open(path) as f:", true),
                ("try: open(path)", false),
                ("open(path, close=True)", false),
            ],
            Difficulty::Medium,
            "The with statement drives the context-manager protocol.",
        ),
        mc(
            "Which statement about Python's GIL is accurate?",
            &[
                ("It allows true parallel bytecode execution across threads", false),
                ("It lets only one thread execute Python bytecode at a time", true),
                ("It only applies to asyncio code", false),
                ("It was removed in Python 3", false),
            ],
            Difficulty::Hard,
            "CPython's global interpreter lock serializes bytecode execution.",
        ),
        tf(
            "Python uses indentation to delimit code blocks.",
            true,
            Difficulty::Easy,
            "Whitespace is syntactically significant in Python.",
        ),
        tf(
            "Dictionaries in Python 3.7+ preserve insertion order.",
            true,
            Difficulty::Medium,
            "Order preservation became a language guarantee in 3.7.",
        ),
        sa(
            "What is the name of the special method invoked when an object is created, spelled with double underscores?",
            "__init__",
            Difficulty::Easy,
        ),
        sa(
            "Which function wraps another function to extend its behavior and is applied with the @ syntax?",
            "decorator",
            Difficulty::Medium,
        ),
        sa(
            "What kind of function uses the 'yield' keyword to produce a lazy sequence of values?",
            "generator",
            Difficulty::Hard,
        ),
    ]
}

fn data_structures_bank() -> Vec<Question> {
    vec![
        mc(
            "What is the average-case time complexity of looking up a key in a hash table?",
            &[("O(n)", false), ("O(log n)", false), ("O(1)", true), ("O(n log n)", false)],
            Difficulty::Easy,
            "With a good hash function, lookups touch a single bucket on average.",
        ),
        mc(
            "Which data structure is the natural fit for implementing undo functionality?",
            &[("Queue", false), ("Stack", true), ("Heap", false), ("Graph", false)],
            Difficulty::Easy,
            "Undo is last-in-first-out: the most recent action is reverted first.",
        ),
        mc(
            "What is the worst-case time complexity of quicksort?",
            &[("O(n log n)", false), ("O(n)", false), ("O(n^2)", true), ("O(log n)", false)],
            Difficulty::Medium,
            "Consistently bad pivots degrade quicksort to quadratic time.",
        ),
        mc(
            "Which traversal of a binary search tree visits keys in sorted order?",
            &[("Pre-order", false), ("In-order", true), ("Post-order", false), ("Level-order", false)],
            Difficulty::Medium,
            "In-order traversal visits left subtree, node, right subtree.",
        ),
        mc(
            "Which algorithm finds shortest paths from one source in a graph with non-negative edge weights?",
            &[
                ("Depth-first search", false),
                ("Dijkstra's algorithm", true),
                ("Kruskal's algorithm", false),
                ("Binary search", false),
            ],
            Difficulty::Hard,
            "Dijkstra greedily settles the closest unsettled vertex; negative edges break it.",
        ),
        tf(
            "A balanced binary search tree guarantees O(log n) worst-case lookup.",
            true,
            Difficulty::Medium,
            "Balancing bounds the tree height logarithmically.",
        ),
        tf(
            "Binary search can be applied to an unsorted array.",
            false,
            Difficulty::Easy,
            "Binary search requires sorted input to discard half the range each step.",
        ),
        sa(
            "Which data structure processes elements in first-in-first-out order?",
            "queue",
            Difficulty::Easy,
        ),
        sa(
            "What is the name of the technique where a function calls itself to solve smaller subproblems?",
            "recursion",
            Difficulty::Medium,
        ),
        sa(
            "Which optimization technique stores results of overlapping subproblems to avoid recomputation?",
            "dynamic programming",
            Difficulty::Hard,
        ),
    ]
}

fn web_bank() -> Vec<Question> {
    vec![
        mc(
            "Which HTML element is the correct container for the page's primary navigation links?",
            &[("<div>", false), ("<nav>", true), ("<section>", false), ("<header>", false)],
            Difficulty::Easy,
            "Semantic elements describe intent to browsers and assistive tech.",
        ),
        mc(
            "In CSS, which property controls the space between an element's border and its content?",
            &[("margin", false), ("padding", true), ("gap", false), ("outline", false)],
            Difficulty::Easy,
            "Padding is inside the border; margin is outside it.",
        ),
        mc(
            "Which HTTP status code indicates a resource was not found?",
            &[("200", false), ("301", false), ("404", true), ("500", false)],
            Difficulty::Easy,
            "4xx codes indicate client-side errors; 404 is the missing-resource case.",
        ),
        mc(
            "What does CSS specificity determine?",
            &[
                ("The order stylesheets are downloaded", false),
                ("Which conflicting rule applies to an element", true),
                ("How fast selectors are matched", false),
                ("Whether styles are inherited", false),
            ],
            Difficulty::Medium,
            "Higher-specificity selectors win when multiple rules target the same element.",
        ),
        mc(
            "Which mechanism lets a server declare which foreign origins may read its responses?",
            &[("CSP", false), ("CORS", true), ("HSTS", false), ("TLS", false)],
            Difficulty::Hard,
            "Cross-Origin Resource Sharing headers relax the same-origin policy.",
        ),
        tf(
            "HTTPS encrypts traffic between the browser and the server.",
            true,
            Difficulty::Easy,
            "TLS provides confidentiality and integrity for HTTP traffic.",
        ),
        tf(
            "A cookie marked HttpOnly can be read by client-side JavaScript.",
            false,
            Difficulty::Medium,
            "HttpOnly hides the cookie from document.cookie to blunt XSS.",
        ),
        sa(
            "What does HTML stand for?",
            "HyperText Markup Language",
            Difficulty::Easy,
        ),
        sa(
            "Which CSS layout system arranges items in rows and columns simultaneously?",
            "grid",
            Difficulty::Medium,
        ),
        sa(
            "What is the browser's programmatic representation of the page document called?",
            "Document Object Model",
            Difficulty::Medium,
        ),
    ]
}

fn general_bank() -> Vec<Question> {
    vec![
        mc(
            "What is the primary purpose of version control systems like Git?",
            &[
                ("Compiling source code", false),
                ("Tracking and merging changes to files over time", true),
                ("Hosting databases", false),
                ("Encrypting source files", false),
            ],
            Difficulty::Easy,
            "Version control records history and coordinates concurrent changes.",
        ),
        mc(
            "Which of these best describes an API?",
            &[
                ("A programming language", false),
                ("A contract through which software components communicate", true),
                ("A database index", false),
                ("A compiler optimization", false),
            ],
            Difficulty::Easy,
            "An API defines the operations one component exposes to another.",
        ),
        mc(
            "What does 'refactoring' mean?",
            &[
                ("Rewriting code in another language", false),
                ("Restructuring code without changing its behavior", true),
                ("Deleting unused features", false),
                ("Adding new functionality", false),
            ],
            Difficulty::Medium,
            "Refactoring improves internal structure while preserving observable behavior.",
        ),
        mc(
            "Which practice involves writing a failing test before the production code that makes it pass?",
            &[
                ("Continuous deployment", false),
                ("Pair programming", false),
                ("Test-driven development", true),
                ("Code review", false),
            ],
            Difficulty::Medium,
            "TDD cycles red, green, refactor.",
        ),
        mc(
            "What is the main trade-off of adding a cache in front of a data store?",
            &[
                ("Slower reads for faster writes", false),
                ("Staleness risk in exchange for lower latency", true),
                ("Higher durability at higher cost", false),
                ("Smaller storage footprint", false),
            ],
            Difficulty::Hard,
            "Caches serve faster reads but can return data the source has since changed.",
        ),
        tf(
            "Compiled programs are translated to machine code before they run.",
            true,
            Difficulty::Easy,
            "Compilation happens ahead of execution, unlike interpretation.",
        ),
        tf(
            "Encryption and hashing are interchangeable because both are reversible.",
            false,
            Difficulty::Medium,
            "Hashing is one-way; encryption is designed to be reversed with a key.",
        ),
        sa(
            "What term describes a piece of code that does not change external state and always returns the same output for the same input?",
            "pure function",
            Difficulty::Medium,
        ),
        sa(
            "What is the common three-letter acronym for the pattern separating data, presentation, and control logic?",
            "MVC",
            Difficulty::Easy,
        ),
        sa(
            "Which development practice merges every change into a shared mainline and verifies it with automated builds?",
            "continuous integration",
            Difficulty::Hard,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn react_title_selects_react_bank() {
        assert_eq!(detect_topic("Intro to React", None), Topic::React);
        assert_eq!(detect_topic("Advanced React Patterns", Some("Frontend")), Topic::React);
    }

    #[test]
    fn topic_detection_is_case_insensitive() {
        assert_eq!(detect_topic("JAVASCRIPT Deep Dive", None), Topic::JavaScript);
        assert_eq!(detect_topic("python for beginners", None), Topic::Python);
        assert_eq!(detect_topic("Data Structures 101", None), Topic::DataStructures);
        assert_eq!(detect_topic("HTML and CSS Crash Course", None), Topic::Web);
    }

    #[test]
    fn category_participates_in_matching() {
        assert_eq!(detect_topic("Build Real Projects", Some("Web Development")), Topic::Web);
    }

    #[test]
    fn unknown_titles_fall_back_to_general() {
        assert_eq!(detect_topic("Watercolor Painting", Some("Art")), Topic::General);
    }

    #[test]
    fn fallback_returns_exactly_requested_count() {
        let qs = fallback_questions("Intro to React", None, 10);
        assert_eq!(qs.len(), 10);
        // ids are reassigned 1..=n after the shuffle
        let mut ids: Vec<i32> = qs.iter().map(|q| q.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn fallback_draws_only_from_matched_bank() {
        let react_prompts: Vec<String> = react_bank().into_iter().map(|q| q.prompt).collect();
        let qs = fallback_questions("Intro to React", None, 10);
        for q in &qs {
            assert!(react_prompts.contains(&q.prompt), "{} not in react bank", q.prompt);
        }
        // and a javascript-only question never leaks in
        let js_only = "What does 'typeof null' evaluate to?";
        assert!(!qs.iter().any(|q| q.prompt == js_only));
    }

    #[test]
    fn fallback_caps_at_bank_size() {
        let qs = fallback_questions("Watercolor Painting", None, 50);
        assert_eq!(qs.len(), general_bank().len());
    }

    #[test]
    fn every_bank_has_valid_questions() {
        for topic in [
            Topic::React,
            Topic::JavaScript,
            Topic::Python,
            Topic::DataStructures,
            Topic::Web,
            Topic::General,
        ] {
            for q in bank_for(topic) {
                assert!(!q.prompt.is_empty());
                assert!(q.points > 0.0);
                match q.kind {
                    QuestionKind::MultipleChoice | QuestionKind::TrueFalse => {
                        let (_, opt) = q.correct_option().expect("choice question needs a correct option");
                        assert!(!opt.text.is_empty());
                    }
                    QuestionKind::ShortAnswer | QuestionKind::FillBlank => {
                        assert!(!q.correct_answer_text().unwrap().is_empty());
                    }
                    QuestionKind::Essay => {}
                }
            }
        }
    }
}
