//! Snapshot tests for TypeScript code generation.
//!
//! Small files are pinned with inline snapshots; larger ones are checked for
//! the lines that matter. Run `cargo insta review` after intentional changes.

use crudforge_codegen::{
    CompilationContext, Pipeline,
    testing::{BLOG_SQL, PRODUCT_SQL, all_features, compile_sql, compile_sql_with, generate_to_temp},
};
use crudforge_codegen_typescript::{Generator, LanguageCodegen};
use crudforge_ir::{DatabaseKind, Features};
use crudforge_schema::{ProjectConfig, Target, parse_sql};

/// Generate code and return files sorted by path for deterministic snapshots.
fn generate_files(ctx: CompilationContext) -> Vec<(String, String)> {
    let generator = Generator::from_context(ctx).expect("pipeline produced no model");
    let mut files: Vec<(String, String)> = generator
        .preview()
        .into_iter()
        .map(|f| (f.path, f.content))
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}

fn get_file<'a>(files: &'a [(String, String)], path: &str) -> &'a str {
    files
        .iter()
        .find(|(p, _)| p == path)
        .map(|(_, c)| c.as_str())
        .unwrap_or_else(|| panic!("{path} not generated"))
}

fn blog(features: Features) -> Vec<(String, String)> {
    generate_files(compile_sql_with(BLOG_SQL, Target::TypescriptNestjs, features).unwrap())
}

fn compile_for(sql: &str, database: DatabaseKind) -> CompilationContext {
    let mut config = ProjectConfig::new("shop", "schema.sql", Target::TypescriptNestjs);
    config.generate.database = database;
    let schema = parse_sql(sql, "schema.sql").unwrap();
    Pipeline::for_target(Target::TypescriptNestjs)
        .run(config, schema)
        .unwrap()
}

#[test]
fn test_mapping_helper() {
    let files = blog(Features::default());
    insta::assert_snapshot!(get_file(&files, "src/common/mapping.ts"), @r"
    // Code generated by crudforge. DO NOT EDIT.

    /** Drops undefined values so absent fields keep their default or current value. */
    export function compact<T extends object>(value: T): Partial<T> {
      return Object.fromEntries(
        Object.entries(value).filter(([, field]) => field !== undefined),
      ) as Partial<T>;
    }
    ");
}

#[test]
fn test_post_entity_relations() {
    let files = blog(Features::default());
    let entity = get_file(&files, "src/post/post.entity.ts");

    assert!(entity.contains("@Entity({ name: 'posts' })"));
    assert!(entity.contains("export class Post {"));
    assert!(entity.contains("import { User } from '../user/user.entity';"));
    assert!(entity.contains("@ManyToOne(() => User, (user) => user.posts)"));
    assert!(entity.contains("@JoinColumn({ name: 'author_id', referencedColumnName: 'id' })"));
    assert!(entity.contains("author?: User;"));
    assert!(entity.contains("@ManyToMany(() => Tag, (tag) => tag.posts)"));
    assert!(entity.contains("name: 'post_tags',"));
    assert!(entity.contains("tags?: Tag[];"));

    // the junction is owned by posts
    let tag = get_file(&files, "src/tag/tag.entity.ts");
    assert!(tag.contains("@ManyToMany(() => Post, (post) => post.tags)"));
    assert!(!tag.contains("JoinTable"));
}

#[test]
fn test_user_response_hides_password() {
    let files = blog(Features::default());
    let response = get_file(&files, "src/user/dto/user-response.dto.ts");
    assert!(response.contains("export class UserResponse {"));
    assert!(response.contains("email!: string;"));
    assert!(!response.contains("passwordHash"));

    let create = get_file(&files, "src/user/dto/create-user.dto.ts");
    assert!(create.contains("export class CreateUserDto {"));
    assert!(create.contains("passwordHash!: string;"));
}

#[test]
fn test_post_controller_routes() {
    let files = blog(Features::default());
    let controller = get_file(&files, "src/post/post.controller.ts");

    assert!(controller.contains("@Controller('posts')"));
    assert!(controller.contains("list(@Query() query: PaginationQuery): Promise<PostResponse[]>"));
    assert!(controller.contains("show(@Param('id', ParseIntPipe) id: number): Promise<PostResponse>"));
    assert!(controller.contains("@HttpCode(204)"));
    assert!(controller.contains("@Get(':id/author')"));
    assert!(controller.contains("async author(@Param('id', ParseIntPipe) id: number): Promise<UserResponse>"));
    assert!(controller.contains("@Get(':id/comments')"));
    assert!(controller.contains("@Put(':id/tags/:tagId')"));
    assert!(controller.contains(
        "async addTag(@Param('id', ParseIntPipe) id: number, @Param('tagId', ParseIntPipe) tagId: number): Promise<void>"
    ));
    assert!(controller.contains("@Delete(':id/tags/:tagId')"));
    assert!(!controller.contains("JwtAuthGuard"));
}

#[test]
fn test_post_repository() {
    let files = blog(Features::default());
    let repo = get_file(&files, "src/post/post.repository.ts");
    assert!(repo.contains("export class PostRepository {"));
    assert!(repo.contains("findById(id: number): Promise<Post | null>"));
    assert!(repo.contains("async findTags(id: number)"));
    assert!(repo.contains("async addTag("));
    assert!(repo.contains("async removeTag("));
}

#[test]
fn test_auth_protects_writes() {
    let files = blog(all_features());
    let controller = get_file(&files, "src/post/post.controller.ts");
    assert!(controller.contains("import { JwtAuthGuard } from '../auth/jwt-auth.guard';"));
    // create, update, destroy, addTag and removeTag
    assert_eq!(controller.matches("@UseGuards(JwtAuthGuard)").count(), 5);

    let app = get_file(&files, "src/app.module.ts");
    assert!(app.contains("AuthModule,"));
    assert!(app.contains("StorageModule,"));
    assert!(app.contains("providers: [{ provide: APP_GUARD, useClass: ThrottleGuard }],"));

    let package = get_file(&files, "package.json");
    for dep in ["@nestjs/jwt", "bcryptjs", "@types/multer"] {
        assert!(package.contains(dep), "missing {dep}");
    }

    let env = get_file(&files, ".env.example");
    assert!(env.contains("JWT_SECRET="));
    assert!(env.contains("UPLOAD_DIR="));
}

#[test]
fn test_service_stub_hashes_password_with_auth() {
    let files = blog(all_features());
    let service = get_file(&files, "src/user/user.service.ts");
    assert!(service.contains("crudforge:stub"));
    assert!(service.contains("hashPassword"));

    let files = blog(Features::default());
    assert!(!get_file(&files, "src/user/user.service.ts").contains("hashPassword"));
}

#[test]
fn test_mysql_database_options() {
    let files = generate_files(compile_for(BLOG_SQL, DatabaseKind::Mysql));
    assert!(get_file(&files, "src/database.ts").contains("type: 'mysql'"));
    assert!(get_file(&files, "package.json").contains("\"mysql2\""));
}

#[test]
fn test_uuid_and_decimal_columns() {
    let files = generate_files(compile_sql(PRODUCT_SQL, Target::TypescriptNestjs).unwrap());
    let entity = get_file(&files, "src/product/product.entity.ts");
    assert!(entity.contains("@PrimaryGeneratedColumn('uuid')"));
    assert!(entity.contains("decimalTransformer"));

    let controller = get_file(&files, "src/product/product.controller.ts");
    assert!(controller.contains("@Param('id', ParseUUIDPipe) id: string"));
}

#[test]
fn test_generated_e2e_tests() {
    let files = blog(Features::default());
    let helpers = get_file(&files, "test/helpers.ts");
    assert!(helpers.contains("export async function createPost(app: INestApplication, token?: string): Promise<Row>"));
    assert!(helpers.contains("const author = await createUser(app, token);"));

    let post = get_file(&files, "test/post.e2e-spec.ts");
    assert!(post.contains("it('creates, reads, updates and deletes'"));
    assert!(post.contains("'/posts/2147483000'"));
    assert!(!post.contains("rejects writes without a token"));
}

#[test]
fn test_tests_feature_off() {
    let features = Features {
        tests: false,
        ..Features::default()
    };
    let files = blog(features);
    assert!(!files.iter().any(|(p, _)| p.starts_with("test/")));
    assert!(!get_file(&files, "package.json").contains("\"jest\""));
}

#[test]
fn test_generate_then_clean_removes_orphans() {
    let ctx = compile_sql(BLOG_SQL, Target::TypescriptNestjs).unwrap();
    let generator = Generator::from_context(ctx).unwrap();
    let temp = generate_to_temp(|dir| generator.generate(dir).map(|_| ())).unwrap();
    assert!(temp.path().join("src/tag/tag.controller.ts").exists());

    let smaller = BLOG_SQL.replace(
        "CREATE TABLE post_tags (\n    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,\n    tag_id INT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,\n    PRIMARY KEY (post_id, tag_id)\n);",
        "",
    );
    let smaller = smaller.replace(
        "CREATE TABLE tags (\n    id SERIAL PRIMARY KEY,\n    name VARCHAR(50) NOT NULL UNIQUE\n);",
        "",
    );
    let ctx = compile_sql(&smaller, Target::TypescriptNestjs).unwrap();
    let generator = Generator::from_context(ctx).unwrap();

    let result = generator.clean(temp.path()).unwrap();
    assert!(result.deleted.iter().any(|p| p == "src/tag/tag.controller.ts"));
    assert!(result.deleted.iter().any(|p| p == "src/tag/tag.service.ts"));
    assert!(!temp.path().join("src/tag").exists());
    assert!(temp.path().join("src/post/post.entity.ts").exists());
}
